use std::io::{self, BufRead, Write};

use serde::Serialize;

use gocachectl::{
    disk_info, providers, CacheError, CacheKind, CacheProvider, CacheResult, ClearSelection,
    Coordinator, DiskInfo, Toolchain,
};

use crate::cli::CacheFlags;
use crate::output;

/// Flags shared by every command.
pub struct Options {
    pub verbose: bool,
    pub json: bool,
    pub quiet: bool,
}

fn print_json<T: Serialize>(value: &T) -> CacheResult<()> {
    let text =
        serde_json::to_string_pretty(value).map_err(|e| CacheError::Io(e.into()))?;
    println!("{text}");
    Ok(())
}

pub fn run_stats(flags: &CacheFlags, toolchain: &dyn Toolchain, opts: &Options) -> CacheResult<()> {
    if let Some(kind) = flags.single() {
        let coordinator = Coordinator::discover(&[kind], toolchain)?;
        let stats = coordinator.stats_by_kind(kind)?;
        if opts.json {
            return print_json(&stats);
        }
        if !opts.quiet {
            output::print_title(&format!("{} Statistics", kind.label()));
        }
        output::print_cache_stats(&stats, opts.verbose);
        return Ok(());
    }

    let coordinator = Coordinator::discover(&CacheKind::ALL, toolchain)?;
    let stats = coordinator.all_stats()?;
    if opts.json {
        return print_json(&stats);
    }
    if !opts.quiet {
        output::print_title("Go Cache Statistics");
    }
    for cache in &stats.caches {
        output::print_cache_stats(cache, opts.verbose);
    }
    output::print_totals(&stats);
    Ok(())
}

pub struct ClearArgs {
    pub selection: ClearSelection,
    pub force: bool,
    pub dry_run: bool,
}

pub fn run_clear(args: &ClearArgs, toolchain: &dyn Toolchain, opts: &Options) -> CacheResult<()> {
    if args.selection.is_empty() {
        return Err(CacheError::InvalidSelection);
    }
    let kinds = args.selection.kinds();

    // Caches that cannot be opened are reported with the outcome instead of
    // stopping the others from being cleared.
    let mut opened: Vec<Box<dyn CacheProvider>> = Vec::new();
    let mut unavailable = Vec::new();
    for &kind in &kinds {
        match providers::open_provider(kind, toolchain) {
            Ok(provider) => opened.push(provider),
            Err(err) => unavailable.push((kind, err)),
        }
    }
    let coordinator = Coordinator::new(opened);

    if !opts.quiet && !opts.json {
        let plan: Vec<_> = coordinator
            .providers()
            .iter()
            .filter_map(|p| p.stats().ok())
            .collect();
        output::print_clear_plan(&plan);
        for (kind, err) in &unavailable {
            output::print_warning(&format!("{}: {err}", kind.label()));
        }
    }

    if args.dry_run {
        if !opts.quiet && !opts.json {
            output::print_dry_run_footer();
        }
        return Ok(());
    }

    if !args.force {
        let mut prompt = PromptStream::for_options(opts).writer();
        let mut input = io::stdin().lock();
        let message = "Are you sure you want to delete these caches?";
        if !confirm(&mut *prompt, &mut input, message)? {
            if !opts.quiet {
                output::print_info("Operation cancelled");
            }
            return Ok(());
        }
    }

    let mut outcome = coordinator.clear(args.selection)?;
    for (kind, err) in &unavailable {
        outcome.record_failure(*kind, err);
    }

    if opts.json {
        return print_json(&outcome);
    }
    if !opts.quiet {
        output::print_clear_outcome(&outcome, &kinds);
    } else if outcome.provider_failures > 0 {
        output::print_warning(&format!(
            "{} caches could not be cleared",
            outcome.provider_failures
        ));
    }
    Ok(())
}

/// Where interactive prompts are written. With `--json`, stdout carries the
/// JSON document only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptStream {
    Stdout,
    Stderr,
}

impl PromptStream {
    fn for_options(opts: &Options) -> Self {
        if opts.json {
            Self::Stderr
        } else {
            Self::Stdout
        }
    }

    fn writer(self) -> Box<dyn Write> {
        match self {
            Self::Stdout => Box::new(io::stdout()),
            Self::Stderr => Box::new(io::stderr()),
        }
    }
}

/// Ask a yes/no question. Anything but "y"/"yes" is a no, and so is EOF.
fn confirm(prompt: &mut dyn Write, input: &mut dyn BufRead, message: &str) -> CacheResult<bool> {
    write!(prompt, "{message} [y/N]: ")?;
    prompt.flush()?;

    let mut response = String::new();
    if input.read_line(&mut response)? == 0 {
        return Ok(false);
    }
    let response = response.trim().to_lowercase();
    Ok(response == "y" || response == "yes")
}

#[derive(Serialize)]
struct CacheInfo {
    go_version: Option<String>,
    gocache: Option<String>,
    gomodcache: Option<String>,
    build_cache_ok: bool,
    mod_cache_ok: bool,
    build_cache_disk: Option<DiskInfo>,
    mod_cache_disk: Option<DiskInfo>,
}

pub fn run_info(toolchain: &dyn Toolchain, opts: &Options) -> CacheResult<()> {
    let version = toolchain.version();
    let gocache = toolchain.cache_root(CacheKind::Build);
    let gomodcache = toolchain.cache_root(CacheKind::Modules);

    let build_ok = gocache.as_ref().is_ok_and(|p| p.is_dir());
    let mod_ok = gomodcache.as_ref().is_ok_and(|p| p.is_dir());

    let info = CacheInfo {
        go_version: version.as_ref().ok().cloned(),
        gocache: gocache.as_ref().ok().map(|p| p.display().to_string()),
        gomodcache: gomodcache.as_ref().ok().map(|p| p.display().to_string()),
        build_cache_ok: build_ok,
        mod_cache_ok: mod_ok,
        build_cache_disk: gocache
            .as_ref()
            .ok()
            .filter(|_| build_ok)
            .and_then(|p| disk_info(p)),
        mod_cache_disk: gomodcache
            .as_ref()
            .ok()
            .filter(|_| mod_ok)
            .and_then(|p| disk_info(p)),
    };

    if opts.json {
        return print_json(&info);
    }

    if !opts.quiet {
        output::print_title("Go Cache Information");
    }
    match &version {
        Ok(v) => println!("Go Version:      {v}"),
        Err(err) => output::print_warning(&err.to_string()),
    }
    println!();

    output::print_cache_location(
        "Build Cache",
        CacheKind::Build.env_var(),
        info.gocache.as_deref(),
        build_ok,
        info.build_cache_disk,
    );
    output::print_cache_location(
        "Module Cache",
        CacheKind::Modules.env_var(),
        info.gomodcache.as_deref(),
        mod_ok,
        info.mod_cache_disk,
    );

    if opts.verbose {
        for err in [gocache.err(), gomodcache.err()].into_iter().flatten() {
            match err.kind() {
                Some(kind) => output::print_warning(&format!("{}: {err}", kind.label())),
                None => output::print_warning(&err.to_string()),
            }
        }
        output::print_info(
            "The test cache lives inside the build cache. \
             Use 'gocachectl stats' to see cache sizes.",
        );
    }
    Ok(())
}
