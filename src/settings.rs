use std::path::{Path, PathBuf};
use anyhow::{Result, Context};
use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::fs::File;

use crate::constants::*;

#[derive(Debug, Clone)]
pub struct Settings {
    pub input_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    /// Defaults to `{output_dir}/{input dir name}.pdf` when unset
    pub report_path: Option<PathBuf>,
    pub extensions: Vec<String>,
    pub recursive: bool,
    pub write_manifest: bool,
    pub qr_module_px: u32,
    pub qr_quiet_zone: u32,
    pub preview_max_px: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            input_dir: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            report_path: None,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            recursive: false,
            write_manifest: false,
            qr_module_px: QR_MODULE_PX,
            qr_quiet_zone: QR_QUIET_ZONE,
            preview_max_px: PREVIEW_MAX_PX,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or from [`Settings::config_path`] when no
    /// path is given. A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::config_path);
        let mut settings = Settings::default();
        if !config_path.exists() {
            return Ok(settings);
        }

        let file = File::open(&config_path)
            .with_context(|| format!("Failed to open config file {}", config_path.display()))?;
        let reader = BufReader::new(file);
        let mut config_map = HashMap::new();

        for line in reader.lines() {
            let line = line.context("Failed to read line from config")?;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                config_map.insert(key.trim().to_string(), value.trim().trim_matches('"').to_string());
            }
        }

        if let Some(input_dir) = config_map.get("input_dir") {
            settings.input_dir = Some(PathBuf::from(input_dir));
        }
        if let Some(output_dir) = config_map.get("output_dir") {
            settings.output_dir = PathBuf::from(output_dir);
        }
        if let Some(report_path) = config_map.get("report_path") {
            settings.report_path = Some(PathBuf::from(report_path));
        }
        if let Some(extensions) = config_map.get("extensions") {
            let parsed = parse_extensions(extensions);
            if !parsed.is_empty() {
                settings.extensions = parsed;
            }
        }
        if let Some(recursive) = config_map.get("recursive").and_then(|v| v.parse::<bool>().ok()) {
            settings.recursive = recursive;
        }
        if let Some(manifest) = config_map.get("write_manifest").and_then(|v| v.parse::<bool>().ok()) {
            settings.write_manifest = manifest;
        }
        if let Some(px) = config_map.get("qr_module_px").and_then(|v| v.parse::<u32>().ok()) {
            settings.qr_module_px = px.clamp(1, QR_MODULE_PX_MAX);
        }
        if let Some(zone) = config_map.get("qr_quiet_zone").and_then(|v| v.parse::<u32>().ok()) {
            settings.qr_quiet_zone = zone.min(QR_QUIET_ZONE_MAX);
        }
        if let Some(px) = config_map.get("preview_max_px").and_then(|v| v.parse::<u32>().ok()) {
            settings.preview_max_px = px.max(1);
        }

        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).context("Creating config directory")?;
        }

        let mut content = String::new();
        content.push_str("# photo_geoqr configuration file\n");

        if let Some(ref input_dir) = self.input_dir {
            content.push_str(&format!("input_dir = \"{}\"\n", input_dir.display()));
        }
        content.push_str(&format!("output_dir = \"{}\"\n", self.output_dir.display()));
        if let Some(ref report_path) = self.report_path {
            content.push_str(&format!("report_path = \"{}\"\n", report_path.display()));
        }
        content.push_str(&format!("extensions = {}\n", self.extensions.join(",")));
        content.push_str(&format!("recursive = {}\n", self.recursive));
        content.push_str(&format!("write_manifest = {}\n", self.write_manifest));
        content.push_str(&format!("qr_module_px = {}\n", self.qr_module_px));
        content.push_str(&format!("qr_quiet_zone = {}\n", self.qr_quiet_zone));
        content.push_str(&format!("preview_max_px = {}\n", self.preview_max_px));

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    pub fn set_extensions<I, S>(&mut self, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let parsed: Vec<String> = extensions
            .into_iter()
            .flat_map(|s| parse_extensions(s.as_ref()))
            .collect();
        if !parsed.is_empty() {
            self.extensions = parsed;
        }
    }

    /// Case-insensitive allow-list check on the file extension.
    pub fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|ext| self.extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }

    /// Report destination, falling back to `{output_dir}/{input dir name}.pdf`.
    pub fn resolved_report_path(&self, input_dir: &Path) -> PathBuf {
        if let Some(ref path) = self.report_path {
            return path.clone();
        }
        let project = input_dir
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .unwrap_or(FALLBACK_PROJECT_NAME);
        self.output_dir.join(format!("{}.pdf", project))
    }

    pub fn config_path() -> PathBuf {
        PathBuf::from(CONFIG_FILE_NAME)
    }
}

fn parse_extensions(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().trim_start_matches('.').to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
