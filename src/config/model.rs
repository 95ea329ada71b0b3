// src/config/model.rs

use serde::Deserialize;

/// Top-level configuration as read from `Mpbuild.toml`.
///
/// ```toml
/// [project]
/// src = "miniprogram"
/// dist = "dist"
/// exclude = ["!miniprogram/vendor/**"]
/// assets = "assets"
///
/// [style]
/// extensions = ["sass", "scss", "wxss"]
/// source_map = true
/// ```
///
/// Every section is optional and defaults to the conventional mini-program
/// layout; only `[project]` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Source/destination roots and global selection rules.
    pub project: ProjectSection,

    /// Style-sheet compilation (`sass`/`scss` → `wxss`).
    #[serde(default)]
    pub style: StyleSection,

    /// Typed scripts (`ts` → `js`).
    #[serde(default = "CategorySection::typescript")]
    pub typescript: CategorySection,

    /// Plain scripts (`js`, copied through).
    #[serde(default = "CategorySection::javascript")]
    pub javascript: CategorySection,

    /// Typed markup scripts (`wxts` → `wxs`).
    #[serde(default = "CategorySection::wxts")]
    pub wxts: CategorySection,

    /// Plain markup scripts (`wxs`, copied through).
    #[serde(default = "CategorySection::wxjs")]
    pub wxjs: CategorySection,

    /// Markup files (`wxml`).
    #[serde(default = "CategorySection::wxml")]
    pub wxml: CategorySection,

    /// JSON page/component manifests.
    #[serde(default = "CategorySection::json")]
    pub json: CategorySection,

    /// Images, streamed rather than buffered.
    #[serde(default = "CategorySection::image")]
    pub image: CategorySection,

    /// Everything selected by the assets directory, copied verbatim.
    #[serde(default = "CategorySection::copy")]
    pub copy: CategorySection,

    /// Packaged npm output copied into the distribution tree.
    #[serde(default)]
    pub npm: NpmSection,
}

/// `[project]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    /// Source tree root. Normalized by the loader before any task runs.
    pub src: String,

    /// Destination tree root. Normalized by the loader before any task runs.
    pub dist: String,

    /// Extra glob patterns appended verbatim to every synthesized glob set.
    /// Conventionally negations such as `"!miniprogram/vendor/**"`.
    #[serde(default)]
    pub exclude: Option<OneOrMany>,

    /// Static-assets directory, relative to `src`. Excluded from every
    /// category except the one that explicitly copies assets.
    #[serde(default)]
    pub assets: Option<String>,
}

/// A single pattern or a list of patterns, as TOML allows either.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// View the value as a slice of patterns regardless of shape.
    pub fn as_slice(&self) -> &[String] {
        match self {
            OneOrMany::One(s) => std::slice::from_ref(s),
            OneOrMany::Many(v) => v.as_slice(),
        }
    }
}

/// `[style]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StyleSection {
    /// Extensions compiled by the style stage. `sass` selects the indented
    /// dialect; `wxss` is passed through the compiler as plain css.
    #[serde(default = "default_style_extensions")]
    pub extensions: Vec<String>,

    /// Additional include paths handed to the compiler after the file's own
    /// directory.
    #[serde(default)]
    pub include_paths: Vec<String>,

    /// Whether the pipeline's source-map contract is active for this stage.
    #[serde(default)]
    pub source_map: bool,
}

fn default_style_extensions() -> Vec<String> {
    vec!["sass".into(), "scss".into(), "wxss".into()]
}

impl Default for StyleSection {
    fn default() -> Self {
        Self {
            extensions: default_style_extensions(),
            include_paths: Vec::new(),
            source_map: false,
        }
    }
}

/// A generic per-category section: which extensions it selects, what the
/// outputs are renamed to, and optionally an external command to pipe each
/// file through.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct CategorySection {
    /// Extensions selected from the source tree. May be empty, in which case
    /// the category is driven entirely by the assets-inclusion pattern.
    pub extensions: Vec<String>,

    /// Extension the outputs are renamed to; `None` keeps the original.
    pub output_extension: Option<String>,

    /// External compiler command. The file's contents are piped through its
    /// stdin and the stdout becomes the output. `None` copies through.
    pub command: Option<String>,
}

impl CategorySection {
    fn with(exts: &[&str], out: Option<&str>) -> Self {
        Self {
            extensions: exts.iter().map(|e| e.to_string()).collect(),
            output_extension: out.map(str::to_string),
            command: None,
        }
    }

    pub fn typescript() -> Self {
        Self::with(&["ts"], Some("js"))
    }

    pub fn javascript() -> Self {
        Self::with(&["js"], None)
    }

    pub fn wxts() -> Self {
        Self::with(&["wxts"], Some("wxs"))
    }

    pub fn wxjs() -> Self {
        Self::with(&["wxs"], None)
    }

    pub fn wxml() -> Self {
        Self::with(&["wxml"], None)
    }

    pub fn json() -> Self {
        Self::with(&["json"], None)
    }

    pub fn image() -> Self {
        Self::with(&["png", "jpg", "jpeg", "gif", "svg", "webp"], None)
    }

    pub fn copy() -> Self {
        Self::with(&[], None)
    }
}

/// `[npm]` section: the pre-built package directory copied verbatim.
#[derive(Debug, Clone, Deserialize)]
pub struct NpmSection {
    /// Directory under `src` holding packaged npm output.
    #[serde(default = "default_npm_dir")]
    pub dir: String,
}

fn default_npm_dir() -> String {
    "miniprogram_npm".to_string()
}

impl Default for NpmSection {
    fn default() -> Self {
        Self {
            dir: default_npm_dir(),
        }
    }
}
