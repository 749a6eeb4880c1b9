//! Font discovery for the PDF renderer.
//!
//! `genpdf` needs TrueType files for glyph metrics, so a font family has to be
//! found on disk before anything can be laid out. The bundled Roboto family is
//! searched first; installed system families are the fallback.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{self, FontData, FontFamily};
use log::{debug, warn};

/// Name of the bundled font family.
pub const BUNDLED_FAMILY_NAME: &str = "Roboto";

/// Environment variable pointing at a directory with the bundled font files.
pub const FONTS_DIR_ENV: &str = "KINDLE_HIGHLIGHTS_FONTS_DIR";

const BUNDLED_FONT_FILES: &[&str] = &[
    "Roboto-Regular.ttf",
    "Roboto-Bold.ttf",
    "Roboto-Italic.ttf",
    "Roboto-BoldItalic.ttf",
];

/// File names of the four styles of an installed font family.
struct SystemFamily {
    name: &'static str,
    directories: &'static [&'static str],
    regular: &'static str,
    bold: &'static str,
    italic: &'static str,
    bold_italic: &'static str,
}

impl SystemFamily {
    fn files(&self) -> [(&'static str, &'static str); 4] {
        [
            (self.regular, "regular"),
            (self.bold, "bold"),
            (self.italic, "italic"),
            (self.bold_italic, "bold italic"),
        ]
    }
}

const SYSTEM_FAMILIES: &[SystemFamily] = &[
    SystemFamily {
        name: "Arial",
        directories: &["/System/Library/Fonts/Supplemental", "/Library/Fonts"],
        regular: "Arial.ttf",
        bold: "Arial Bold.ttf",
        italic: "Arial Italic.ttf",
        bold_italic: "Arial Bold Italic.ttf",
    },
    SystemFamily {
        name: "Liberation Sans",
        directories: &[
            "/usr/share/fonts/truetype/liberation",
            "/usr/share/fonts/truetype/liberation2",
            "/usr/share/fonts/liberation-sans",
            "/usr/share/fonts/liberation",
        ],
        regular: "LiberationSans-Regular.ttf",
        bold: "LiberationSans-Bold.ttf",
        italic: "LiberationSans-Italic.ttf",
        bold_italic: "LiberationSans-BoldItalic.ttf",
    },
    SystemFamily {
        name: "DejaVu Sans",
        directories: &["/usr/share/fonts/truetype/dejavu", "/usr/share/fonts/dejavu"],
        regular: "DejaVuSans.ttf",
        bold: "DejaVuSans-Bold.ttf",
        italic: "DejaVuSans-Oblique.ttf",
        bold_italic: "DejaVuSans-BoldOblique.ttf",
    },
];

const WINDOWS_FAMILY: SystemFamily = SystemFamily {
    name: "Arial",
    directories: &[],
    regular: "arial.ttf",
    bold: "arialbd.ttf",
    italic: "ariali.ttf",
    bold_italic: "arialbi.ttf",
};

/// Directory holding the bundled fonts inside the crate sources.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn env_path(var: &str) -> Option<PathBuf> {
    env::var_os(var).and_then(|value| {
        let path = PathBuf::from(value);
        if path.as_os_str().is_empty() {
            None
        } else {
            Some(path)
        }
    })
}

fn bundled_directory_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    let mut push = |candidate: PathBuf| {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    };

    if let Some(path) = explicit {
        push(path.to_path_buf());
    }
    if let Some(path) = env_path(FONTS_DIR_ENV) {
        push(path);
    }
    if let Some(bin_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        push(bin_dir.join("assets/fonts"));
    }
    push(bundled_fonts_source_dir());

    candidates
}

fn missing_bundled_files(directory: &Path) -> Vec<&'static str> {
    BUNDLED_FONT_FILES
        .iter()
        .copied()
        .filter(|name| !directory.join(name).is_file())
        .collect()
}

fn not_found(message: String, detail: &str) -> Error {
    Error::new(message, io::Error::new(io::ErrorKind::NotFound, detail.to_owned()))
}

/// Finds the first candidate directory that contains all bundled font files.
pub fn resolve_bundled_directory(explicit: Option<&Path>) -> Result<PathBuf, Error> {
    let mut attempts = Vec::new();

    for candidate in bundled_directory_candidates(explicit) {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }
        let missing = missing_bundled_files(&candidate);
        if missing.is_empty() {
            return Ok(candidate);
        }
        attempts.push(format!(
            "{} (missing files [{}])",
            candidate.display(),
            missing.join(", ")
        ));
    }

    Err(not_found(
        format!(
            "Unable to locate the {} font family. Checked: {}. Set {} to a directory with the font files.",
            BUNDLED_FAMILY_NAME,
            attempts.join(", "),
            FONTS_DIR_ENV
        ),
        "bundled fonts directory not found",
    ))
}

fn load_bundled_family(explicit: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    let directory = resolve_bundled_directory(explicit)?;
    debug!("Loading {} fonts from {}", BUNDLED_FAMILY_NAME, directory.display());

    fonts::from_files(&directory, BUNDLED_FAMILY_NAME, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load font family '{}' from {}: {}",
                BUNDLED_FAMILY_NAME,
                directory.display(),
                err
            ),
            io::Error::new(io::ErrorKind::Other, err.to_string()),
        )
    })
}

fn load_font_file(path: &Path, family: &str, style: &str) -> Result<FontData, Error> {
    FontData::load(path, None).map_err(|err| {
        Error::new(
            format!(
                "Failed to load {} {} font at {}: {}",
                family,
                style,
                path.display(),
                err
            ),
            io::Error::new(io::ErrorKind::InvalidData, err.to_string()),
        )
    })
}

fn load_system_family(
    family: &SystemFamily,
    directory: &Path,
) -> Result<FontFamily<FontData>, Error> {
    let [regular, bold, italic, bold_italic] = family
        .files()
        .map(|(file, style)| load_font_file(&directory.join(file), family.name, style));

    Ok(FontFamily {
        regular: regular?,
        bold: bold?,
        italic: italic?,
        bold_italic: bold_italic?,
    })
}

fn family_present(family: &SystemFamily, directory: &Path) -> bool {
    family
        .files()
        .iter()
        .all(|(file, _)| directory.join(file).is_file())
}

fn windows_font_directory() -> Option<PathBuf> {
    ["WINDIR", "SystemRoot"]
        .iter()
        .filter_map(|var| env_path(var))
        .map(|root| root.join("Fonts"))
        .find(|candidate| candidate.is_dir())
}

fn system_candidates() -> Vec<(&'static SystemFamily, PathBuf)> {
    let mut candidates: Vec<(&'static SystemFamily, PathBuf)> = Vec::new();

    if let Some(directory) = windows_font_directory() {
        candidates.push((&WINDOWS_FAMILY, directory));
    }
    for family in SYSTEM_FAMILIES {
        for directory in family.directories {
            candidates.push((family, PathBuf::from(directory)));
        }
    }

    candidates
}

fn system_font_family() -> Result<FontFamily<FontData>, Error> {
    for (family, directory) in system_candidates() {
        if family_present(family, &directory) {
            debug!("Loading system family '{}' from {}", family.name, directory.display());
            return load_system_family(family, &directory);
        }
    }

    Err(not_found(
        "No installed fallback font family (Arial, Liberation Sans, DejaVu Sans) was found".to_owned(),
        "system fonts not found",
    ))
}

fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Loads the font family used for rendering.
///
/// `explicit` is searched before [`FONTS_DIR_ENV`], the executable directory
/// and the crate's `assets/fonts`. When the bundled family is absent an
/// installed system family is used instead.
pub fn load_font_family(explicit: Option<&Path>) -> Result<FontFamily<FontData>, Error> {
    match load_bundled_family(explicit) {
        Ok(family) => Ok(family),
        Err(err) if fonts_missing(&err) => match system_font_family() {
            Ok(fallback) => {
                warn!("Bundled fonts unavailable ({}); using an installed font family.", err);
                Ok(fallback)
            }
            Err(fallback_err) => {
                warn!(
                    "Bundled fonts unavailable ({}); system fallback failed: {}",
                    err, fallback_err
                );
                Err(not_found(
                    format!("{} No system fallback either: {}", err, fallback_err),
                    "no usable fonts",
                ))
            }
        },
        Err(err) => Err(err),
    }
}

/// Indicates whether [`load_font_family`] can find a family without an explicit directory.
pub fn fonts_available() -> bool {
    resolve_bundled_directory(None).is_ok()
        || system_candidates()
            .iter()
            .any(|(family, directory)| family_present(family, directory))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::{missing_bundled_files, resolve_bundled_directory, BUNDLED_FONT_FILES};

    #[test]
    fn explicit_directory_with_all_files_is_preferred() {
        let dir = tempfile::tempdir().expect("temp dir");
        for name in BUNDLED_FONT_FILES {
            fs::write(dir.path().join(name), b"").expect("create font placeholder");
        }
        let resolved = resolve_bundled_directory(Some(dir.path())).expect("directory resolves");
        assert_eq!(resolved, dir.path());
    }

    #[test]
    fn reports_missing_files() {
        let dir = tempfile::tempdir().expect("temp dir");
        fs::write(dir.path().join("Roboto-Regular.ttf"), b"").expect("create font placeholder");
        let missing = missing_bundled_files(dir.path());
        assert_eq!(
            missing,
            vec!["Roboto-Bold.ttf", "Roboto-Italic.ttf", "Roboto-BoldItalic.ttf"]
        );
    }
}
