// HTML site generator
//
// Writes the static site files to disk. A single-class request writes
// one fixed filename; a batch writes one page per class path plus the
// index page, and the index filename doubles as the site entry point.

use crate::classify::ClassReport;
use crate::discovery::DiscoveryIndex;
use crate::error::Result;
use crate::output::templates::{SearchEntry, TemplateEngine};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Filename for a single-class request and for the index page
pub const INDEX_FILENAME: &str = "classify.html";

/// Configuration for site generation
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Output directory
    pub output_dir: PathBuf,
    /// Project name for titles
    pub project_name: String,
    /// Known-app groups for display grouping
    pub known_apps: BTreeMap<String, Vec<String>>,
    /// Whether to copy assets
    pub copy_assets: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            project_name: "Project".to_string(),
            known_apps: BTreeMap::new(),
            copy_assets: true,
        }
    }
}

/// HTML site generator
pub struct SiteGenerator {
    config: SiteConfig,
    template_engine: TemplateEngine,
}

impl SiteGenerator {
    /// Create a new site generator
    pub fn new(config: SiteConfig) -> Result<Self> {
        let template_engine = TemplateEngine::new()?;
        Ok(Self {
            config,
            template_engine,
        })
    }

    /// Generate the complete static site.
    ///
    /// A single-class request writes the fixed single-class filename
    /// and no index; a batch writes one page per class path plus the
    /// index. The caller decides which: a batch with only one
    /// surviving report is still a batch.
    pub fn generate(
        &self,
        reports: &[ClassReport],
        index: &DiscoveryIndex,
        batch: bool,
    ) -> Result<GenerationReport> {
        let mut generation = GenerationReport::default();

        self.create_directories()?;

        if self.config.copy_assets {
            self.copy_assets()?;
            generation.assets_copied = true;
        }

        for report in reports {
            self.generate_class_page(report, batch)?;
            generation.pages_generated += 1;
        }

        if batch {
            self.generate_index(index)?;
            generation.index_generated = true;
        }

        self.generate_search_index(reports, batch)?;
        generation.search_index_generated = true;

        Ok(generation)
    }

    /// Create the output directory structure
    fn create_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.config.output_dir)?;
        fs::create_dir_all(self.config.output_dir.join("assets"))?;
        Ok(())
    }

    /// Copy static assets (CSS)
    fn copy_assets(&self) -> Result<()> {
        let assets_dir = self.config.output_dir.join("assets");
        let css_content = include_str!("../../assets/style.css");
        fs::write(assets_dir.join("style.css"), css_content)?;
        Ok(())
    }

    /// Filename for one class page
    fn page_filename(report: &ClassReport, batch: bool) -> String {
        if batch {
            format!("{}.html", report.path())
        } else {
            INDEX_FILENAME.to_string()
        }
    }

    /// Generate one class page
    fn generate_class_page(&self, report: &ClassReport, batch: bool) -> Result<()> {
        let html = self.template_engine.render_klass(
            report,
            &self.config.known_apps,
            &self.config.project_name,
        )?;

        let path = self
            .config
            .output_dir
            .join(Self::page_filename(report, batch));
        fs::write(&path, html)?;

        Ok(())
    }

    /// Generate the index page from discovery results
    fn generate_index(&self, index: &DiscoveryIndex) -> Result<()> {
        let html = self
            .template_engine
            .render_index(index, &self.config.project_name)?;

        let path = self.config.output_dir.join(INDEX_FILENAME);
        fs::write(&path, html)?;

        Ok(())
    }

    /// Generate the search index (search.json)
    fn generate_search_index(&self, reports: &[ClassReport], batch: bool) -> Result<()> {
        let entries: Vec<SearchEntry> = reports
            .iter()
            .map(|report| SearchEntry {
                name: report.name.clone(),
                kind: "class".to_string(),
                path: Self::page_filename(report, batch),
                description: report.doc.clone(),
                module: report.module.clone(),
            })
            .collect();

        let json = serde_json::to_string_pretty(&entries)?;
        let path = self.config.output_dir.join("search.json");
        fs::write(&path, json)?;

        Ok(())
    }

    /// Get the output directory
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }
}

/// Report of what was generated
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub pages_generated: usize,
    pub assets_copied: bool,
    pub index_generated: bool,
    pub search_index_generated: bool,
}

impl GenerationReport {
    pub fn summary(&self) -> String {
        format!(
            "Generated {} pages, index: {}, assets: {}",
            self.pages_generated,
            if self.index_generated { "yes" } else { "no" },
            if self.assets_copied { "yes" } else { "no" }
        )
    }
}
