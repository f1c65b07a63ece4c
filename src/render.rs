use std::time::Duration;

use color_eyre::eyre::Result;
use datasetkit_app::Task;
use datasetkit_models::{DeleteReport, HashStripReport, LabelReport, MergeReport, RenameOutcome, ScanResult};
use datasetkit_utils::format_bytes;
use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos:>3}% {msg}";

/// Drives a progress bar from the task's events until it completes.
///
/// Events without a percentage (per-file errors, warnings) are printed
/// above the bar instead of replacing its message.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub async fn follow<T>(mut task: Task<T>, quiet: bool) -> Result<Task<T>> {
    let bar = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(100)
    };
    bar.set_style(ProgressStyle::with_template(BAR_TEMPLATE)?.progress_chars("=> "));
    bar.enable_steady_tick(Duration::from_millis(100));

    while let Some(event) = task.next_event().await {
        match event.percent {
            Some(percent) => {
                bar.set_position(percent.round() as u64);
                bar.set_message(event.message);
            }
            None => bar.println(format!("  ! {}", event.message)),
        }
    }

    bar.finish_and_clear();
    Ok(task)
}

pub fn print_scan(scan: &ScanResult) {
    println!(
        "▶ Scanned {} files in {} ({:.2?})",
        scan.total_files(),
        scan.folder.display(),
        scan.duration
    );
    for path in &scan.unreadable {
        println!("  ! could not read {}", path.display());
    }

    if !scan.has_duplicates() {
        println!("No duplicates found.");
        return;
    }

    println!(
        "Found {} duplicate group(s), {} removable file(s), {} reclaimable:",
        scan.total_groups(),
        scan.total_duplicates(),
        format_bytes(scan.total_wasted_space())
    );
    for (i, group) in scan.groups.iter().enumerate() {
        let short_digest = group.digest.get(..12).unwrap_or(&*group.digest);
        println!(" Group {} ({} each, {short_digest}):", i + 1, format_bytes(group.keeper().size));
        println!("   keep   {}", group.keeper().path.display());
        for file in group.removable() {
            println!("   remove {}", file.path.display());
        }
    }
}

pub fn print_delete(report: &DeleteReport) {
    println!(
        "🧹 Deleted {} file(s) and {} label(s)",
        report.media_deleted, report.sidecars_deleted
    );
    print_errors(&report.errors);
}

pub fn print_labels(report: &LabelReport) {
    println!("▶ {} image(s) checked", report.total_images);
    println!("  {} already labelled", report.already_labelled);
    println!("  {} empty label(s) created", report.created);
    print_errors(&report.errors);
}

pub fn print_merge(report: &MergeReport) {
    println!("▶ Merged {} source folder(s)", report.sources);
    for source in &report.missing_sources {
        println!("  ! source not found: {}", source.display());
    }
    println!(
        "  images: {} copied, {} skipped -> {}",
        report.images_copied,
        report.images_skipped,
        report.images_dir.display()
    );
    println!(
        "  labels: {} copied, {} skipped -> {}",
        report.labels_copied,
        report.labels_skipped,
        report.labels_dir.display()
    );
    print_errors(&report.errors);
}

pub fn print_strip(report: &HashStripReport) {
    println!("▶ {} label(s) checked", report.total);
    println!("  {} renamed", report.renamed);
    println!("  {} already without hash", report.already_correct);
    println!("  {} without matching image", report.not_found);
    if report.collisions > 0 {
        println!("  {} name collision(s)", report.collisions);
    }
    print_errors(&report.errors);
}

pub fn print_rename(outcome: &RenameOutcome) {
    println!("▶ {} -> {}", outcome.from.display(), outcome.to.display());
}

fn print_errors(errors: &[String]) {
    if errors.is_empty() {
        return;
    }
    println!("  {} error(s):", errors.len());
    for error in errors {
        println!("    {error}");
    }
}
