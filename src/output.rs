use chrono::{DateTime, Utc};
use colored::Colorize;

use gocachectl::utils::{display_path, format_count, format_size, format_time};
use gocachectl::{
    AggregateStats, CacheKind, CacheStats, ClearOutcome, DiskInfo, ModuleInfo, SizeDistribution,
};

fn icon(kind: CacheKind) -> &'static str {
    match kind {
        CacheKind::Build => "📦",
        CacheKind::Modules => "📚",
        CacheKind::Test => "🧪",
    }
}

pub fn print_title(title: &str) {
    println!("{}", title.bold().cyan());
    println!("{}", "=".repeat(title.chars().count()).dimmed());
    println!();
}

fn print_row(label: &str, value: &str) {
    println!("   {:<14}{}", format!("{label}:"), value);
}

fn print_ages(oldest: Option<DateTime<Utc>>, newest: Option<DateTime<Utc>>) {
    if let (Some(oldest), Some(newest)) = (oldest, newest) {
        print_row("Oldest", &format_time(oldest));
        print_row("Newest", &format_time(newest));
    }
}

fn print_distribution(d: &SizeDistribution) {
    println!();
    println!("   {}", "Size distribution:".bold());
    println!(
        "     Small (<1MB):    {} entries ({})",
        format_count(d.small_count),
        format_size(d.small_size)
    );
    println!(
        "     Medium (1-10MB): {} entries ({})",
        format_count(d.medium_count),
        format_size(d.medium_size)
    );
    println!(
        "     Large (>10MB):   {} entries ({})",
        format_count(d.large_count),
        format_size(d.large_size)
    );
}

fn print_top_modules(modules: &[ModuleInfo]) {
    if modules.is_empty() {
        return;
    }
    println!();
    println!("   {}", "Top modules by size:".bold());
    for (i, module) in modules.iter().enumerate() {
        println!(
            "     {:>2}. {}  {}",
            i + 1,
            module.path,
            format_size(module.size).yellow()
        );
    }
}

/// Print one cache's statistics under its heading. Verbose mode adds the
/// build size distribution and the largest modules.
pub fn print_cache_stats(stats: &CacheStats, verbose: bool) {
    let kind = stats.kind();
    println!("{} {}", icon(kind), kind.label().bold().white());
    print_row("Location", &display_path(stats.location()));
    print_row("Size", &format_size(stats.size()).green().to_string());

    let count_label = match kind {
        CacheKind::Modules => "Modules",
        CacheKind::Build | CacheKind::Test => "Entries",
    };
    print_row(count_label, &format_count(stats.item_count()));

    match stats {
        CacheStats::Build(s) => print_ages(s.oldest_entry, s.newest_entry),
        CacheStats::Test(s) => print_ages(s.oldest_entry, s.newest_entry),
        CacheStats::Modules(_) => {}
    }

    if stats.skipped() > 0 {
        let skipped = format!("{} unreadable entries", format_count(stats.skipped()));
        print_row("Skipped", &skipped.yellow().to_string());
    }

    if verbose {
        match stats {
            CacheStats::Build(s) => print_distribution(&s.distribution),
            CacheStats::Modules(s) => print_top_modules(&s.top_modules),
            CacheStats::Test(_) => {}
        }
    }
    println!();
}

pub fn print_totals(stats: &AggregateStats) {
    println!("📊 {}", "Total".bold().white());
    print_row(
        "Total size",
        &format_size(stats.total_size).green().bold().to_string(),
    );
    print_row("Total items", &format_count(stats.total_count));
}

/// Print what a clear would remove.
pub fn print_clear_plan(caches: &[CacheStats]) {
    println!("{}", "Cache entries to be cleared:".bold());
    println!();
    for stats in caches {
        let unit = match stats.kind() {
            CacheKind::Modules => "modules",
            CacheKind::Build | CacheKind::Test => "entries",
        };
        println!(
            "  {} {:<14} {} ({} {unit})",
            icon(stats.kind()),
            format!("{}:", stats.kind().label()),
            format_size(stats.size()).yellow(),
            format_count(stats.item_count()),
        );
    }
    let total: u64 = caches.iter().map(CacheStats::size).sum();
    println!();
    println!(
        "  {} {}",
        "Total to be cleared:".bold(),
        format_size(total).green().bold()
    );
    println!();
}

pub fn print_clear_outcome(outcome: &ClearOutcome, kinds: &[CacheKind]) {
    println!();
    println!("{}", "Results:".bold());
    println!();
    for &kind in kinds {
        println!(
            "  {} {:<14} {} entries deleted",
            icon(kind),
            format!("{}:", kind.label()),
            format_count(outcome.deleted(kind)),
        );
    }
    println!();
    println!(
        "{} {}",
        "Cleaned!".green().bold(),
        format!("{} freed.", format_size(outcome.total_freed)).green()
    );
    if outcome.skipped > 0 {
        print_warning(&format!(
            "{} entries could not be removed",
            format_count(outcome.skipped)
        ));
    }
    for failure in &outcome.failures {
        print_warning(&format!("{}: {}", failure.kind.label(), failure.message));
    }
}

pub fn print_cache_location(
    kind_label: &str,
    var: &str,
    location: Option<&str>,
    available: bool,
    disk: Option<DiskInfo>,
) {
    println!("{} ({var}):", kind_label.bold());
    print_row("Location", location.unwrap_or("-"));
    if available {
        print_row("Status", &"✓ Available".green().to_string());
    } else {
        print_row("Status", &"✗ Not available".red().to_string());
    }
    if let Some(disk) = disk {
        print_row(
            "Disk free",
            &format!(
                "{} of {} ({:.0}% used)",
                format_size(disk.available),
                format_size(disk.total),
                disk.usage_percent()
            ),
        );
    }
    println!();
}

pub fn print_warning(msg: &str) {
    println!("{} {}", "Warning:".red().bold(), msg.red());
}

pub fn print_info(msg: &str) {
    println!("{} {}", "Info:".cyan().bold(), msg);
}

pub fn print_dry_run_footer() {
    println!("{}", "[DRY RUN] No entries were deleted.".yellow().bold());
}
