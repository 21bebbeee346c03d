use argh::FromArgs;
use barklens::{AnalysisState, BarklensConfig, BarklensSession, DEFAULT_BASE_URL, PhotoUpload};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Identify a dog breed from a photo via the remote analysis service.
#[derive(FromArgs)]
struct BarklensArgs {
    /// base address of the analysis service
    #[argh(option, short = 'u', default = "DEFAULT_BASE_URL.to_string()")]
    base_url: String,

    /// the path to the dog photo
    #[argh(option, short = 'i')]
    image_path: PathBuf,

    /// request timeout in seconds
    #[argh(option, short = 't')]
    timeout_secs: Option<u64>,
}

fn guess_content_type(path: &Path) -> Option<&'static str> {
    match path.extension().and_then(|ext| ext.to_str())? {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        _ => None,
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: BarklensArgs = argh::from_env();

    let bytes = std::fs::read(&args.image_path)?;
    let file_name = args
        .image_path
        .file_name()
        .and_then(|name| name.to_str())
        .map(String::from);
    let content_type = guess_content_type(&args.image_path).map(String::from);

    let session = BarklensSession::new(BarklensConfig {
        base_url: args.base_url,
        request_timeout: args.timeout_secs.map(Duration::from_secs),
    });

    session.submit(PhotoUpload {
        bytes,
        file_name,
        content_type,
        preview: Some(args.image_path.display().to_string()),
    });

    loop {
        match session.state() {
            AnalysisState::Idle | AnalysisState::Analyzing => {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            AnalysisState::Succeeded(report) => {
                print!("{report}");
                return Ok(());
            }
            AnalysisState::Failed(message) => {
                eprintln!("Error: {message}");
                std::process::exit(1);
            }
        }
    }
}
