#[cfg(not(target_arch = "wasm32"))]
mod cli {
    use std::fs;
    use std::io::{self, Read};
    use std::path::{Path, PathBuf};

    use anyhow::{bail, Context, Result};
    use chrono::Local;
    use clap::{ArgAction, Parser, Subcommand};
    use tracing::info;

    use tailor_site::booking::validate::{booking_controls, PHONE_ERROR};
    use tailor_site::booking::{deep_link, validate, BookingRequest, Composer};
    use tailor_site::gallery::{self, manifest::render_stats, GalleryJob};
    use tailor_site::logging;
    use tailor_site::state::data::FormFieldSet;
    use tailor_site::SiteConfig;

    #[derive(Parser, Debug)]
    #[command(name = "tailor-site")]
    #[command(about = "tooling for the tailoring shop website", long_about = None)]
    struct Cli {
        /// Site configuration file (JSON)
        #[arg(long, global = true)]
        config: Option<PathBuf>,

        /// Raise log verbosity (-v info, -vv debug, -vvv trace)
        #[arg(short, long, action = ArgAction::Count, global = true)]
        verbose: u8,

        #[command(subcommand)]
        command: Command,
    }

    #[derive(Subcommand, Debug)]
    enum Command {
        /// Rebuild the gallery grid and manifest from the images folder
        Gallery {
            /// Site root holding `images/` and `gallery.html`
            #[arg(long, default_value = ".")]
            root: PathBuf,

            /// Images folder, if not `<root>/images`
            #[arg(long)]
            images: Option<PathBuf>,

            /// Gallery page, if not `<root>/gallery.html`
            #[arg(long)]
            page: Option<PathBuf>,

            /// Manifest output, if not `<images>/gallery-manifest.json`
            #[arg(long)]
            manifest: Option<PathBuf>,

            /// Report only, write nothing
            #[arg(long)]
            dry_run: bool,
        },

        /// Validate a booking and print the message it would send
        Preview {
            /// JSON object of form field values, `-` for stdin
            input: PathBuf,
        },

        /// Write the browser media configuration script
        MediaConfig {
            /// Output file; stdout when omitted
            #[arg(short, long)]
            output: Option<PathBuf>,
        },
    }

    pub fn run() -> Result<()> {
        let cli = Cli::parse();
        logging::init_cli(cli.verbose);

        let config = SiteConfig::load_or_default(cli.config.as_deref())
            .context("failed to load site configuration")?;

        match cli.command {
            Command::Gallery {
                root,
                images,
                page,
                manifest,
                dry_run,
            } => {
                let mut job = GalleryJob::for_site(&root, &config.business_name);
                if let Some(images) = images {
                    job.manifest = images.join(gallery::MANIFEST_FILE);
                    job.images_dir = images;
                }
                if let Some(page) = page {
                    job.page = page;
                }
                if let Some(manifest) = manifest {
                    job.manifest = manifest;
                }
                job.dry_run = dry_run;
                run_gallery(&job)
            }
            Command::Preview { input } => run_preview(&input, &config),
            Command::MediaConfig { output } => run_media_config(output.as_deref(), &config),
        }
    }

    fn run_gallery(job: &GalleryJob) -> Result<()> {
        println!("🔍 Scanning {}...", job.images_dir.display());
        let report = gallery::generate(job, Local::now().naive_local())
            .with_context(|| format!("gallery generation failed for {}", job.images_dir.display()))?;

        println!("\n{}", render_stats(&report.manifest.images));

        if report.manifest.images.is_empty() {
            println!("⚠️  No images found. Add images to the folder first.");
        } else if job.dry_run {
            println!("Dry run: {} and {} left untouched.", job.page.display(), job.manifest.display());
        } else {
            println!("✅ Manifest saved: {}", job.manifest.display());
            println!("✅ Gallery updated: {}", job.page.display());
        }
        Ok(())
    }

    fn read_input(input: &Path) -> Result<String> {
        if input == Path::new("-") {
            let mut json = String::new();
            io::stdin()
                .read_to_string(&mut json)
                .context("failed to read stdin")?;
            return Ok(json);
        }
        fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))
    }

    fn run_preview(input: &Path, config: &SiteConfig) -> Result<()> {
        let fields = FormFieldSet::from_json_object(&read_input(input)?)
            .context("booking input must be a JSON object of field values")?;

        let controls = booking_controls(&fields);
        let report = validate(&controls);
        if !report.is_valid() {
            for &index in &report.missing {
                println!("✗ Missing required field: {}", controls[index].name);
            }
            if report.bad_phone.is_some() {
                println!("✗ {}", PHONE_ERROR);
            }
            bail!("booking rejected");
        }

        let request = BookingRequest::from_fields(&fields);
        let message = Composer::from_config(config).compose(&request, Local::now().naive_local());
        let link = deep_link(&config.messaging, &message);
        info!(fields = fields.len(), "booking preview rendered");

        println!("{}\n\n{}", message, link);
        Ok(())
    }

    fn run_media_config(output: Option<&Path>, config: &SiteConfig) -> Result<()> {
        let script = config.media.to_script()?;
        match output {
            Some(path) => {
                fs::write(path, script).with_context(|| format!("failed to write {}", path.display()))?;
                println!("✅ Media config written: {}", path.display());
            }
            None => print!("{}", script),
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}
