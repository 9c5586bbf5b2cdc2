//! Run setup: input resolution and config overrides.

use coverfit_core::{Config, Result};
use std::path::PathBuf;

use super::ProcessArgs;

/// Expand `~` in the input and check that it names a directory.
pub fn resolve_input(args: &ProcessArgs) -> anyhow::Result<PathBuf> {
    let raw = args.input.to_string_lossy();
    let input = PathBuf::from(shellexpand::tilde(&raw).into_owned());

    if !input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the directory path and try again.",
            input
        );
    }
    if !input.is_dir() {
        anyhow::bail!(
            "Input path is not a directory: {:?}\n\n  Hint: Point coverfit at the folder holding your MP3 files.",
            input
        );
    }
    Ok(input)
}

/// Apply command-line overrides on top of the loaded config.
pub fn apply_overrides(mut config: Config, args: &ProcessArgs) -> Result<Config> {
    if let Some(width) = args.max_width {
        config.artwork.max_width = width;
    }
    if let Some(height) = args.max_height {
        config.artwork.max_height = height;
    }
    if let Some(quality) = args.quality {
        config.artwork.jpeg_quality = quality;
    }
    if args.follow_links {
        config.processing.follow_links = true;
    }

    config.validate()?;
    tracing::debug!(
        "Bounding box {}x{}, JPEG quality {}",
        config.artwork.max_width,
        config.artwork.max_height,
        config.artwork.jpeg_quality
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_config_values() {
        let args = ProcessArgs {
            max_width: Some(320),
            max_height: Some(240),
            quality: Some(70),
            follow_links: true,
            ..ProcessArgs::default()
        };

        let config = apply_overrides(Config::default(), &args).unwrap();
        assert_eq!(config.artwork.max_width, 320);
        assert_eq!(config.artwork.max_height, 240);
        assert_eq!(config.artwork.jpeg_quality, 70);
        assert!(config.processing.follow_links);
    }

    #[test]
    fn no_overrides_keep_config() {
        let config = apply_overrides(Config::default(), &ProcessArgs::default()).unwrap();
        assert_eq!(config.artwork.max_width, 500);
        assert_eq!(config.artwork.max_height, 500);
        assert_eq!(config.artwork.jpeg_quality, 85);
        assert!(!config.processing.follow_links);
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let args = ProcessArgs {
            max_width: Some(0),
            ..ProcessArgs::default()
        };
        let err = apply_overrides(Config::default(), &args).unwrap_err();
        assert!(matches!(err, coverfit_core::CoverfitError::Config(_)));
        assert!(err.to_string().contains("max_width"));
    }

    #[test]
    fn resolve_input_rejects_files_and_missing_paths() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("song.mp3");
        std::fs::write(&file, b"x").unwrap();

        let args = ProcessArgs {
            input: file,
            ..ProcessArgs::default()
        };
        assert!(resolve_input(&args).is_err());

        let args = ProcessArgs {
            input: dir.path().join("missing"),
            ..ProcessArgs::default()
        };
        assert!(resolve_input(&args).is_err());

        let args = ProcessArgs {
            input: dir.path().to_path_buf(),
            ..ProcessArgs::default()
        };
        assert_eq!(resolve_input(&args).unwrap(), dir.path());
    }
}
