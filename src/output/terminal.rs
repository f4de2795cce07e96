// Colored terminal output for footprint and comparison reports.
//
// This module handles all terminal-specific formatting: colors, tables,
// tier badges. The main.rs command handlers delegate here.

use colored::Colorize;

use crate::graph::GraphNode;
use crate::models::RiskTier;
use crate::pipeline::{ComparisonReport, FootprintReport};

const BIO_PREVIEW_CHARS: usize = 60;

/// Display a footprint: discovered profiles, exposure, web mentions.
pub fn display_footprint(report: &FootprintReport) {
    println!(
        "\n{}",
        format!("=== Digital Footprint: {} ===", report.query).bold()
    );
    println!();

    let profiles: Vec<&GraphNode> = report.graph.nodes.iter().filter(|n| !n.is_root()).collect();

    if profiles.is_empty() {
        println!("  No public profiles found.");
    } else {
        println!(
            "  {:<32} {:<24} {:>9}  {}",
            "Profile".dimmed(),
            "Name".dimmed(),
            "Followers".dimmed(),
            "Bio".dimmed(),
        );
        println!("  {}", "-".repeat(96).dimmed());

        for node in &profiles {
            let meta = node.meta.clone().unwrap_or_default();
            let followers = meta
                .followers
                .map(|f| f.to_string())
                .unwrap_or_else(|| "-".to_string());
            let bio = meta
                .bio
                .as_deref()
                .map(|b| super::truncate_chars(&b.replace('\n', " "), BIO_PREVIEW_CHARS))
                .unwrap_or_default();

            println!(
                "  {:<32} {:<24} {:>9}  {}",
                node.label,
                super::truncate_chars(meta.display_name.as_deref().unwrap_or("-"), 22),
                followers,
                bio.dimmed(),
            );
            if let Some(url) = meta.url.as_deref() {
                println!("  {:<32} {}", "", url.cyan());
            }
        }
    }

    println!();
    println!(
        "  Exposure index: {} ({} profiles, {} mentions)",
        colorize_exposure(report.exposure.exposure_index),
        report.exposure.profile_count,
        report.exposure.mention_count,
    );

    if !report.mentions.is_empty() {
        println!("\n  {} web mentions:", report.mentions.len());
        for (i, mention) in report.mentions.iter().enumerate() {
            println!("    {}. {}", i + 1, mention.title);
            println!("       {}", mention.link.cyan());
            if let Some(snippet) = mention.snippet.as_deref() {
                println!(
                    "       {}",
                    super::truncate_chars(&snippet.replace('\n', " "), 120).dimmed()
                );
            }
        }
    }
    println!();
}

/// Display an impersonation comparison.
pub fn display_comparison(report: &ComparisonReport) {
    let assessment = &report.assessment;

    println!(
        "\n{}",
        format!("=== {} vs {} ===", report.user_a, report.user_b).bold()
    );
    println!();
    println!(
        "  Impersonation likelihood: {:.0}%  [{}]",
        assessment.likelihood * 100.0,
        colorize_tier(assessment.risk_tier),
    );
    println!();

    for score in assessment.dimension_scores() {
        println!(
            "  {:<16} {:>4.0}%",
            score.dimension.as_str(),
            score.value * 100.0
        );
    }
    if assessment.image_sim.is_none() {
        println!("  {:<16} {}", "Profile image", "n/a".dimmed());
    }
    println!(
        "  {:<16} {:>4.0}%",
        "Mutual presence",
        assessment.mutual_presence_ratio * 100.0
    );

    if report.composite_scores.is_empty() {
        println!("\n  No shared platforms.");
    } else {
        println!("\n  Shared platforms:");
        for (platform, comparison) in &report.composite_scores {
            println!(
                "    {:<10} {:>4.0}%  (username {:.2}, bio {:.2})",
                platform.title(),
                comparison.composite * 100.0,
                comparison.username_sim,
                comparison.bio_sim,
            );
        }
    }

    if !report.insights.is_empty() {
        println!("\n  Findings:");
        for insight in &report.insights {
            println!("    {} {}", "!".yellow(), insight);
        }
    }
    println!();
}

/// Colorize a risk tier.
fn colorize_tier(tier: RiskTier) -> colored::ColoredString {
    match tier {
        RiskTier::High => tier.as_str().red().bold(),
        RiskTier::Moderate => tier.as_str().yellow(),
        RiskTier::Low => tier.as_str().green(),
    }
}

fn colorize_exposure(index: u32) -> colored::ColoredString {
    let text = format!("{index}/100");
    match index {
        75.. => text.red().bold(),
        40..=74 => text.yellow(),
        _ => text.green(),
    }
}
