//! The `lenstag tag` command: tag one local file without starting the server.

use clap::Args;
use lenstag_core::{Config, Tagger, TaggingRequest};
use std::path::{Path, PathBuf};

use super::types::ProviderArgs;

/// Arguments for the `tag` command.
#[derive(Args, Debug)]
pub struct TagArgs {
    /// Image file to tag
    #[arg(required = true)]
    pub input: PathBuf,

    /// MIME type to declare (guessed from the file extension when omitted)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub provider: ProviderArgs,
}

/// Execute the tag command.
///
/// Prints the same JSON body `/lensTag` would return and exits non-zero when
/// the outcome is not a valid tag document.
pub async fn execute(args: TagArgs, mut config: Config) -> anyhow::Result<()> {
    args.provider.apply(&mut config)?;
    let tagger = Tagger::from_config(&config)?;

    let input = super::expand_path(&args.input);
    let bytes = tokio::fs::read(&input).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to read {}: {e}\n\n  Hint: Check the file path and try again.",
            input.display()
        )
    })?;

    let content_type = args.content_type.or_else(|| guess_content_type(&input));
    let mut request = TaggingRequest::new(bytes, content_type);
    request.file_name = input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());

    let outcome = tagger.tag(&request).await;
    let body = outcome.to_body();
    let text = if args.pretty {
        serde_json::to_string_pretty(&body)?
    } else {
        serde_json::to_string(&body)?
    };
    println!("{text}");

    if !outcome.is_tagged() {
        anyhow::bail!("Tagging failed for {}", input.display());
    }
    Ok(())
}

/// MIME type from a file extension, for the formats vision APIs accept.
fn guess_content_type(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "heic" => "image/heic",
        "heif" => "image/heif",
        _ => return None,
    };
    Some(mime.to_string())
}
