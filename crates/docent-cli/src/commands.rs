//! Content commands: parse, detect, search, validate, sw.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_walkdir::WalkDir;
use docent_content::{BatchReport, ContentFormatDetector, ContentValidator, Detection};
use docent_core::{id_from_path, Article, Error, Result};
use docent_loader::{FsFetcher, LoaderConfig, ParseRequest, StaticContentLoader};
use docent_search::SearchResult;
use futures::StreamExt;

use crate::cli::OutputFormat;
use crate::config::DocentConfig;

// ============================================================================
// Content discovery
// ============================================================================

/// Files under `dir` whose extension is one of `extensions`, sorted.
pub async fn find_content_files(dir: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::not_found(format!("directory {}", dir.display())));
    }

    let mut files = Vec::new();
    let mut walker = WalkDir::new(dir);

    while let Some(entry) = walker.next().await {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                log::warn!("Walk error under {}: {e}", dir.display());
                continue;
            }
        };

        let path = entry.path();
        if path.is_dir() {
            continue;
        }

        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.iter().any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext)));
        if matches {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

fn relative_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::io_with_path(e, path))
}

/// Fill a loader from `dir`.
///
/// A directory with a manifest loads through it; otherwise every content
/// file is parsed with its filename stem as id.
pub async fn load_directory(config: &LoaderConfig, dir: &Path) -> Result<StaticContentLoader> {
    let mut loader = StaticContentLoader::new(config.clone())
        .with_fetcher(Arc::new(FsFetcher::new(dir)));

    if dir.join(&config.manifest_path).is_file() {
        let report = loader.load_manifest().await?;
        log::info!(
            "Loaded {} article(s) from manifest, {} skipped",
            report.loaded.len(),
            report.failed.len()
        );
        return Ok(loader);
    }

    for path in find_content_files(dir, &config.extensions).await? {
        let Some(id) = id_from_path(&path) else {
            continue;
        };
        let content = read(&path).await?;
        loader.parse_content(ParseRequest::new(id, content).filename(relative_name(dir, &path)));
    }
    Ok(loader)
}

// ============================================================================
// parse / detect
// ============================================================================

/// Parse one file into an article.
pub async fn parse_file(config: &LoaderConfig, file: &Path) -> Result<Arc<Article>> {
    let content = read(file).await?;
    let id = id_from_path(file).ok_or_else(|| Error::config("file has no usable name"))?;
    let mut loader = StaticContentLoader::new(config.clone());
    loader.try_parse_content(ParseRequest::new(id, content).filename(file.to_string_lossy()))
}

/// `docent parse`
pub async fn cmd_parse(config: &DocentConfig, file: &Path, html_only: bool) -> Result<()> {
    let article = parse_file(&config.loader, file).await?;
    if html_only {
        println!("{}", article.rendered_content);
    } else {
        println!("{}", serde_json::to_string_pretty(article.as_ref())?);
    }
    Ok(())
}

/// Detect the format of `file`.
pub async fn detect_file(file: &Path, content_only: bool) -> Result<Option<Detection>> {
    let content = read(file).await?;
    let name = file.to_string_lossy();
    let filename = (!content_only).then_some(&*name);
    Ok(ContentFormatDetector::new().detect_from_content(&content, filename))
}

/// `docent detect`
pub async fn cmd_detect(file: &Path, content_only: bool) -> Result<()> {
    match detect_file(file, content_only).await? {
        Some(detection) => {
            println!(
                "{}\t{:.2}\t{}",
                detection.format,
                detection.confidence,
                detection.parser_name.as_deref().unwrap_or("-")
            );
            Ok(())
        }
        None => Err(Error::unsupported(file.to_string_lossy())),
    }
}

// ============================================================================
// search
// ============================================================================

/// Search `dir` for `query`.
pub async fn search_directory(
    config: &LoaderConfig,
    dir: &Path,
    query: &str,
    limit: Option<usize>,
) -> Result<Vec<SearchResult>> {
    let mut config = config.clone();
    if let Some(limit) = limit {
        config.search.max_results = limit;
    }
    let loader = load_directory(&config, dir).await?;
    Ok(loader.search(query))
}

/// `docent search`
pub async fn cmd_search(
    config: &DocentConfig,
    dir: &Path,
    query: &str,
    limit: Option<usize>,
    format: OutputFormat,
) -> Result<()> {
    let results = search_directory(&config.loader, dir, query, limit).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Text if results.is_empty() => println!("No results for '{query}'"),
        OutputFormat::Text => {
            for (rank, result) in results.iter().enumerate() {
                println!("{:>2}. {} [{}] (score {})", rank + 1, result.title, result.id, result.score);
                if !result.snippet.is_empty() {
                    println!("    {}", result.snippet);
                }
            }
        }
    }
    Ok(())
}

// ============================================================================
// validate
// ============================================================================

/// Validate every content file under `dir`.
///
/// Internal links are checked against the ids of the files found.
pub async fn validate_directory(config: &LoaderConfig, dir: &Path) -> Result<BatchReport> {
    let paths = find_content_files(dir, &config.extensions).await?;

    let mut files = Vec::with_capacity(paths.len());
    for path in &paths {
        files.push((relative_name(dir, path), read(path).await?));
    }

    let validator = ContentValidator::new().with_known_ids(paths.iter().filter_map(|p| id_from_path(p)));
    Ok(validator.validate_batch(files.iter().map(|(name, content)| (name.as_str(), content.as_str()))))
}

/// `docent validate`. Returns whether the content is free of errors.
pub async fn cmd_validate(config: &DocentConfig, dir: &Path, format: OutputFormat) -> Result<bool> {
    let batch = validate_directory(&config.loader, dir).await?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&batch)?),
        OutputFormat::Text => {
            for report in batch.reports.iter().filter(|r| !r.issues.is_empty()) {
                println!("{}", report.file);
                for issue in &report.issues {
                    println!("  {issue}");
                }
            }
            println!(
                "{} file(s): {} error(s), {} warning(s), {} info",
                batch.reports.len(),
                batch.errors,
                batch.warnings,
                batch.infos
            );
        }
    }
    Ok(batch.is_valid())
}

// ============================================================================
// sw
// ============================================================================

/// Options for `docent sw`.
#[derive(Debug, Default)]
pub struct SwOptions {
    /// Content directory to pre-cache.
    pub dir: Option<PathBuf>,
    /// Cache name override.
    pub cache_name: Option<String>,
    /// Offline fallback page.
    pub offline_fallback: Option<String>,
}

/// Render the service worker for `options`.
pub async fn render_service_worker(config: &DocentConfig, options: &SwOptions) -> Result<String> {
    let mut script = config.service_worker.clone();
    if let Some(name) = &options.cache_name {
        script.cache_name = name.clone();
    }

    if let Some(dir) = &options.dir {
        let mut urls = Vec::new();
        if dir.join(&config.loader.manifest_path).is_file() {
            urls.push(format!("/{}", config.loader.manifest_path.trim_start_matches('/')));
        }
        for path in find_content_files(dir, &config.loader.extensions).await? {
            urls.push(format!("/{}", relative_name(dir, &path)));
        }
        script = script.with_urls(urls);
    }

    if let Some(fallback) = &options.offline_fallback {
        script = script.with_offline_fallback(fallback);
    }

    script.render()
}

/// `docent sw`
pub async fn cmd_sw(config: &DocentConfig, options: &SwOptions, output: Option<&Path>) -> Result<()> {
    let js = render_service_worker(config, options).await?;
    match output {
        Some(path) => {
            tokio::fs::write(path, js)
                .await
                .map_err(|e| Error::io_with_path(e, path))?;
            println!("Service worker written to {}", path.display());
        }
        None => print!("{js}"),
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
