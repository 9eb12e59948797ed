use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use tracing::info;

use au_app::usecases::KeyTarget;
use au_core::url::content_url;
use au_core::{AssetFile, CallerIdentity, ContentKey, UploaderConfig};

use crate::bootstrap::{build_publish_usecase, StoreBackend};

#[derive(Parser, Debug)]
#[command(
    name = "asset-uploader",
    version,
    about = "Upload files to a remote asset store in chunks"
)]
pub struct Cli {
    /// Config file (defaults to <config dir>/asset-uploader/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a file and print where it is served
    Upload(UploadArgs),
    /// Print the content URL for a key without uploading anything
    Url {
        /// Content key, e.g. /avatars/<owner>/<ts>/me.png
        key: String,
    },
}

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// File to upload
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Namespace the key as /<purpose>/<owner>/<timestamp>/<file name>
    #[arg(long, conflicts_with = "key")]
    pub purpose: Option<String>,

    /// Exact content key to upload under
    #[arg(long)]
    pub key: Option<String>,

    /// Principal the calls are made as
    #[arg(long, value_name = "PRINCIPAL")]
    pub owner: Option<String>,

    /// Bearer token sent with every store call
    #[arg(long, env = "ASSET_UPLOADER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// MIME type recorded on the asset (default application/octet-stream)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Run the whole protocol against an in-memory store
    #[arg(long)]
    pub dry_run: bool,
}

impl UploadArgs {
    fn identity(&self) -> CallerIdentity {
        match &self.owner {
            Some(owner) => CallerIdentity::new(owner.clone(), self.token.clone()),
            None => CallerIdentity::new(CallerIdentity::anonymous().principal(), self.token.clone()),
        }
    }

    fn key_target(&self, file_name: &str) -> KeyTarget {
        match (&self.key, &self.purpose) {
            (Some(key), _) => KeyTarget::Explicit(ContentKey::new(key.clone())),
            (None, Some(purpose)) => KeyTarget::Namespaced {
                purpose: purpose.clone(),
            },
            (None, None) => KeyTarget::Explicit(ContentKey::new(format!("/{file_name}"))),
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = au_infra::config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Upload(args) => upload(&config, args).await,
        Commands::Url { key } => {
            println!("{}", content_url(&config.deployment_context(), &ContentKey::new(key)));
            Ok(())
        }
    }
}

async fn upload(config: &UploaderConfig, args: UploadArgs) -> anyhow::Result<()> {
    let file = read_asset_file(&args.file, args.content_type.clone()).await?;

    let backend = if args.dry_run {
        StoreBackend::InMemory
    } else {
        if config.store.store_id.is_empty() {
            bail!("store.store_id is not configured; set it in the config file or use --dry-run");
        }
        StoreBackend::Http
    };
    info!(file = %args.file.display(), size_bytes = file.size_bytes(), ?backend, "Uploading");

    let usecase = build_publish_usecase(config, backend)?;
    let target = args.key_target(&file.name);
    let published = usecase.execute(&args.identity(), &file, target).await?;

    println!("{}", serde_json::to_string_pretty(&published)?);
    Ok(())
}

async fn read_asset_file(path: &Path, content_type: Option<String>) -> anyhow::Result<AssetFile> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("Not a file path: {}", path.display()))?
        .to_string();
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(AssetFile::new(name, content_type, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_upload_with_purpose() {
        let cli = Cli::try_parse_from([
            "asset-uploader",
            "upload",
            "cv.pdf",
            "--purpose",
            "resumes",
            "--owner",
            "aaaaa-aa",
        ])
        .unwrap();

        let Commands::Upload(args) = cli.command else {
            panic!("expected upload command");
        };
        assert_eq!(args.file, PathBuf::from("cv.pdf"));
        assert_eq!(args.identity().principal(), "aaaaa-aa");
        assert!(matches!(
            args.key_target("cv.pdf"),
            KeyTarget::Namespaced { purpose } if purpose == "resumes"
        ));
    }

    #[test]
    fn test_purpose_and_key_conflict() {
        let result = Cli::try_parse_from([
            "asset-uploader",
            "upload",
            "cv.pdf",
            "--purpose",
            "resumes",
            "--key",
            "/cv.pdf",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_default_key_is_file_name_at_root() {
        let cli = Cli::try_parse_from(["asset-uploader", "upload", "me.png"]).unwrap();
        let Commands::Upload(args) = cli.command else {
            panic!("expected upload command");
        };
        match args.key_target("me.png") {
            KeyTarget::Explicit(key) => assert_eq!(key.as_str(), "/me.png"),
            other => panic!("unexpected target: {other:?}"),
        }
        assert_eq!(args.identity().principal(), CallerIdentity::anonymous().principal());
    }

    #[test]
    fn test_global_config_flag_after_subcommand() {
        let cli =
            Cli::try_parse_from(["asset-uploader", "url", "/a b.png", "--config", "x.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
    }

    #[tokio::test]
    async fn test_dry_run_upload_succeeds_without_store_id() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"payload").unwrap();
        let mut config_file = tempfile::NamedTempFile::new().unwrap();
        config_file.write_all(b"[upload]\nchunk_size_bytes = 3\n").unwrap();

        let cli = Cli::try_parse_from([
            "asset-uploader".to_string(),
            "upload".to_string(),
            file.path().display().to_string(),
            "--dry-run".to_string(),
            "--config".to_string(),
            config_file.path().display().to_string(),
        ])
        .unwrap();

        run(cli).await.unwrap();
    }

    #[tokio::test]
    async fn test_real_upload_requires_store_id() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"payload").unwrap();
        let config_file = tempfile::NamedTempFile::new().unwrap();

        let cli = Cli::try_parse_from([
            "asset-uploader".to_string(),
            "upload".to_string(),
            file.path().display().to_string(),
            "--config".to_string(),
            config_file.path().display().to_string(),
        ])
        .unwrap();

        let err = run(cli).await.unwrap_err();
        assert!(err.to_string().contains("store_id"), "{err}");
    }
}
