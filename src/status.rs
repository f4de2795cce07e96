// System status display: which sources and similarity features are active.

use crate::config::Config;
use crate::similarity::download::{embedding_files_present, embedding_model_dir};

/// One line of the status table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub name: &'static str,
    pub enabled: bool,
    pub detail: String,
}

/// Describe what this configuration will do, without touching the network.
pub fn describe(config: &Config) -> Vec<StatusLine> {
    let embeddings_detail = if !config.enable_embeddings {
        "off (fuzzy bio matching; set ENABLE_EMBEDDINGS=true to enable)".to_string()
    } else if embedding_files_present(&config.model_dir) {
        format!(
            "on, model at {}",
            embedding_model_dir(&config.model_dir).display()
        )
    } else {
        format!(
            "on, but model missing in {} (run `memap download-model`)",
            config.model_dir.display()
        )
    };

    vec![
        StatusLine {
            name: "GitHub",
            enabled: true,
            detail: if config.github_token.is_some() {
                "authenticated".to_string()
            } else {
                "unauthenticated (60 requests/hour)".to_string()
            },
        },
        StatusLine {
            name: "Reddit",
            enabled: true,
            detail: "public JSON".to_string(),
        },
        StatusLine {
            name: "Instagram",
            enabled: true,
            detail: "public web profile (often rate limited)".to_string(),
        },
        StatusLine {
            name: "Twitter",
            enabled: config.twitter_bearer_token.is_some(),
            detail: if config.twitter_bearer_token.is_some() {
                "bearer token set".to_string()
            } else {
                "skipped (TWITTER_BEARER_TOKEN not set)".to_string()
            },
        },
        StatusLine {
            name: "Web mentions",
            enabled: config.google_credentials().is_some(),
            detail: if config.google_credentials().is_some() {
                format!("Google Custom Search, {} results", config.mention_limit)
            } else {
                "skipped (GOOGLE_API_KEY / GOOGLE_CSE_ID not set)".to_string()
            },
        },
        StatusLine {
            name: "Embeddings",
            enabled: config.enable_embeddings && embedding_files_present(&config.model_dir),
            detail: embeddings_detail,
        },
        StatusLine {
            name: "Avatar hashing",
            enabled: config.enable_image_similarity,
            detail: if config.enable_image_similarity {
                "on".to_string()
            } else {
                "off (ENABLE_IMAGE_SIMILARITY=false)".to_string()
            },
        },
    ]
}

/// Display system status to the terminal.
pub fn show(config: &Config) {
    use colored::Colorize;

    for line in describe(config) {
        let marker = if line.enabled {
            "on ".green()
        } else {
            "off".dimmed()
        };
        println!("  [{}] {:<15} {}", marker, line.name, line.detail);
    }
}
