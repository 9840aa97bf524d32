/// Extension-based file categorization.
///
/// This module maps file extensions to named categories using an ordered
/// table. Each category owns a destination folder name; anything the table
/// does not know about lands in the fallback category.
///
/// # Examples
///
/// ```
/// use foldersort::file_category::CategoryTable;
///
/// let table = CategoryTable::standard();
/// assert_eq!(table.classify(".pdf"), "PDFs");
/// assert_eq!(table.classify(".JPG"), "Images");
/// assert_eq!(table.classify(".mp4"), "Others");
/// ```
use std::path::Path;

/// Name of the catch-all category for unmatched extensions.
pub const FALLBACK_CATEGORY: &str = "Others";

/// The default table, in lookup order.
const STANDARD_TABLE: &[(&str, &[&str])] = &[
    ("PDFs", &[".pdf"]),
    ("Images", &[".jpg", ".jpeg", ".png", ".gif"]),
    ("Excel", &[".xls", ".xlsx"]),
    ("Word", &[".doc", ".docx"]),
    ("PowerPoint", &[".ppt", ".pptx"]),
    ("Text", &[".txt"]),
];

/// The broader table. Some extensions appear under several categories;
/// the first one listed wins.
const EXTENDED_TABLE: &[(&str, &[&str])] = &[
    ("PDFs", &[".pdf"]),
    (
        "Word",
        &[".doc", ".docx", ".docm", ".dot", ".dotx", ".dotm", ".rtf"],
    ),
    (
        "Excel",
        &[".xls", ".xlsx", ".xlsm", ".xlsb", ".xlt", ".xltx", ".xltm", ".csv"],
    ),
    (
        "PowerPoint",
        &[
            ".ppt", ".pptx", ".pptm", ".pot", ".potx", ".potm", ".pps", ".ppsx", ".ppsm",
        ],
    ),
    ("Text", &[".txt", ".md", ".rtf", ".log", ".readme"]),
    (
        "Images",
        &[
            ".jpg", ".jpeg", ".png", ".gif", ".bmp", ".tiff", ".tif", ".webp", ".svg", ".ico",
            ".raw", ".cr2", ".nef", ".orf", ".sr2", ".dng", ".heic", ".heif",
        ],
    ),
    (
        "Videos",
        &[
            ".mp4", ".avi", ".mkv", ".mov", ".wmv", ".flv", ".webm", ".m4v", ".3gp", ".mpg",
            ".mpeg", ".m2v", ".divx", ".asf", ".rm", ".rmvb", ".vob", ".ts", ".mts", ".m2ts",
        ],
    ),
    (
        "Audio",
        &[
            ".mp3", ".wav", ".flac", ".aac", ".ogg", ".wma", ".m4a", ".opus", ".aiff", ".au",
            ".ra", ".midi", ".mid", ".ac3", ".dts",
        ],
    ),
    (
        "Archives",
        &[
            ".zip", ".rar", ".7z", ".tar", ".gz", ".bz2", ".xz", ".cab", ".ace", ".arj", ".lzh",
            ".sit", ".sitx", ".sea",
        ],
    ),
    (
        "Executables",
        &[
            ".exe", ".msi", ".msu", ".deb", ".rpm", ".dmg", ".pkg", ".app", ".appx", ".msix",
            ".apk", ".ipa", ".run", ".bin", ".com", ".bat", ".cmd", ".sh", ".ps1",
        ],
    ),
    (
        "Code",
        &[
            ".py", ".js", ".html", ".htm", ".css", ".php", ".java", ".cpp", ".c", ".h", ".cs",
            ".rb", ".go", ".rs", ".swift", ".kt", ".scala", ".pl", ".lua", ".r", ".m", ".sql",
        ],
    ),
    (
        "Web",
        &[
            ".asp", ".aspx", ".jsp", ".scss", ".sass", ".less", ".vue", ".jsx", ".tsx",
        ],
    ),
    (
        "Data",
        &[
            ".json", ".xml", ".yaml", ".yml", ".tsv", ".db", ".sqlite", ".sqlite3", ".mdb",
            ".accdb", ".dbf", ".sav", ".dta",
        ],
    ),
    (
        "Design",
        &[
            ".psd", ".ai", ".eps", ".indd", ".sketch", ".fig", ".xd", ".cdr", ".dwg", ".dxf",
            ".step", ".iges", ".stl", ".obj", ".fbx", ".blend", ".max", ".ma", ".mb",
        ],
    ),
    (
        "System",
        &[
            ".dll", ".sys", ".drv", ".ocx", ".cpl", ".scr", ".vxd", ".inf", ".reg", ".ini",
            ".cfg", ".conf", ".config", ".properties", ".plist",
        ],
    ),
    (
        "Fonts",
        &[
            ".ttf", ".otf", ".woff", ".woff2", ".eot", ".pfb", ".pfm", ".afm", ".bdf", ".pcf",
        ],
    ),
    (
        "Ebooks",
        &[
            ".epub", ".mobi", ".azw", ".azw3", ".fb2", ".lit", ".lrf", ".pdb", ".pml", ".tcr",
        ],
    ),
    (
        "DiskImages",
        &[
            ".iso", ".img", ".nrg", ".mdf", ".cue", ".ccd", ".sub", ".vcd", ".vhd", ".vhdx",
            ".vmdk", ".vdi", ".qcow2",
        ],
    ),
    (
        "Backup",
        &[
            ".bak", ".backup", ".old", ".tmp", ".temp", ".swp", ".swo", ".cache", ".dat", ".dmp",
        ],
    ),
    (
        "Certificates",
        &[
            ".crt", ".cer", ".pem", ".key", ".p12", ".pfx", ".jks", ".keystore", ".pub", ".sig",
        ],
    ),
    (
        "CAD",
        &[
            ".stp", ".igs", ".catpart", ".catproduct", ".prt", ".asm", ".sldprt", ".sldasm",
            ".slddrw",
        ],
    ),
    (
        "3D_Models",
        &[".dae", ".3ds", ".ply", ".x3d", ".gltf", ".glb"],
    ),
    (
        "Email",
        &[".msg", ".eml", ".mbox", ".pst", ".ost", ".dbx", ".mbx", ".emlx"],
    ),
    ("Calendar", &[".ics", ".ical", ".vcs", ".vcf", ".ldif"]),
];

/// Normalizes an extension to lowercase with a single leading dot.
///
/// Empty input (or a lone dot) normalizes to the empty string, which no
/// category claims.
///
/// # Examples
///
/// ```
/// use foldersort::file_category::normalize_extension;
///
/// assert_eq!(normalize_extension("PDF"), ".pdf");
/// assert_eq!(normalize_extension(".Docx"), ".docx");
/// assert_eq!(normalize_extension(""), "");
/// ```
pub fn normalize_extension(ext: &str) -> String {
    let trimmed = ext.trim().trim_start_matches('.');
    if trimmed.is_empty() {
        return String::new();
    }
    format!(".{}", trimmed.to_lowercase())
}

/// Returns the normalized extension of a path's file name.
///
/// Dotfiles such as `.bashrc` and names ending in a dot have no extension.
pub fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| normalize_extension(&ext.to_string_lossy()))
        .unwrap_or_default()
}

/// A named bucket of extensions sharing one destination folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    name: String,
    extensions: Vec<String>,
}

impl Category {
    /// Creates a category, normalizing and de-duplicating its extensions.
    pub fn new<I, S>(name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut category = Self {
            name: name.into(),
            extensions: Vec::new(),
        };
        category.extend(extensions);
        category
    }

    /// The category name, also used as its folder name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Extensions in insertion order.
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Returns true if `ext` (already normalized) belongs to this category.
    pub fn contains(&self, ext: &str) -> bool {
        self.extensions.iter().any(|known| known == ext)
    }

    fn extend<I, S>(&mut self, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for ext in extensions {
            let ext = normalize_extension(ext.as_ref());
            if !ext.is_empty() && !self.contains(&ext) {
                self.extensions.push(ext);
            }
        }
    }
}

/// Ordered mapping from category names to extensions.
///
/// Lookup walks the categories in order and returns the first one claiming
/// the extension. A table is built before a run and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    categories: Vec<Category>,
    fallback: String,
}

impl CategoryTable {
    /// Creates an empty table where every file lands in `fallback`.
    pub fn new(fallback: impl Into<String>) -> Self {
        Self {
            categories: Vec::new(),
            fallback: fallback.into(),
        }
    }

    /// The default table: PDFs, Images, Excel, Word, PowerPoint and Text.
    pub fn standard() -> Self {
        Self::from_static(STANDARD_TABLE)
    }

    /// A broader table covering media, archives, code, fonts and more.
    pub fn extended() -> Self {
        Self::from_static(EXTENDED_TABLE)
    }

    fn from_static(entries: &[(&str, &[&str])]) -> Self {
        entries
            .iter()
            .fold(Self::new(FALLBACK_CATEGORY), |table, (name, exts)| {
                table.with_category(*name, exts.iter())
            })
    }

    /// Adds extensions to a category, creating it after the existing ones if
    /// the name is new.
    ///
    /// # Examples
    ///
    /// ```
    /// use foldersort::file_category::CategoryTable;
    ///
    /// let table = CategoryTable::standard()
    ///     .with_category("Audio", ["mp3", ".WAV"])
    ///     .with_category("Text", ["md"]);
    /// assert_eq!(table.classify(".wav"), "Audio");
    /// assert_eq!(table.classify(".md"), "Text");
    /// ```
    pub fn with_category<I, S>(mut self, name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let name = name.into();
        match self.categories.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.extend(extensions),
            None => self.categories.push(Category::new(name, extensions)),
        }
        self
    }

    /// Returns the category name for an extension.
    ///
    /// Case-insensitive; the leading dot is optional. Never fails: unknown
    /// and empty extensions map to the fallback category.
    pub fn classify(&self, ext: &str) -> &str {
        let ext = normalize_extension(ext);
        if ext.is_empty() {
            return &self.fallback;
        }
        self.categories
            .iter()
            .find(|category| category.contains(&ext))
            .map(Category::name)
            .unwrap_or(self.fallback.as_str())
    }

    /// Classifies a path by its file name's extension.
    pub fn classify_path(&self, path: &Path) -> &str {
        self.classify(&extension_of(path))
    }

    /// Categories in lookup order, without the fallback.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Name of the catch-all category.
    pub fn fallback(&self) -> &str {
        &self.fallback
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::standard()
    }
}
