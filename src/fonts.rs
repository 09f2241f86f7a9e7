use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::OnceLock;

use memmap2::Mmap;
use pdf_writer::{Name, Pdf, Rect, Ref};
use ttf_parser::Face;

use crate::error::Error;

/// Font used both to measure cell text and to print it.
///
/// A TrueType face found on the system is embedded in the PDF; when none of
/// the requested families is installed the standard Helvetica metrics are
/// used instead.
#[derive(Clone)]
pub struct Font {
    family: String,
    face: Option<FaceData>,
}

#[derive(Clone)]
struct FaceData {
    data: Vec<u8>,
    index: u32,
}

impl std::fmt::Debug for Font {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Font")
            .field("family", &self.family)
            .field("embedded", &self.face.is_some())
            .finish()
    }
}

impl Font {
    /// Looks up the first installed family of a `;`-separated candidate list.
    pub fn find(candidates: &str) -> Self {
        for candidate in candidates.split(';').map(str::trim).filter(|c| !c.is_empty()) {
            let Some((path, index)) = find_font_file(candidate) else {
                continue;
            };
            match std::fs::read(&path) {
                Ok(data) => {
                    log::debug!("Font {candidate} → {}", path.display());
                    return Self {
                        family: candidate.to_string(),
                        face: Some(FaceData { data, index }),
                    };
                }
                Err(e) => log::warn!("Cannot read font file {}: {e}", path.display()),
            }
        }
        log::warn!("Font not found: {candidates}, using Helvetica");
        Self::helvetica()
    }

    pub fn from_bytes(family: &str, data: Vec<u8>) -> Result<Self, Error> {
        Face::parse(&data, 0).map_err(|e| Error::Font(format!("{family}: {e}")))?;
        Ok(Self {
            family: family.to_string(),
            face: Some(FaceData { data, index: 0 }),
        })
    }

    pub fn helvetica() -> Self {
        Self {
            family: "Helvetica".into(),
            face: None,
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn is_embedded(&self) -> bool {
        self.face.is_some()
    }

    fn parse_face(&self) -> Option<Face<'_>> {
        let face = self.face.as_ref()?;
        Face::parse(&face.data, face.index).ok()
    }

    /// Advance width of `text` in 1000-units per em.
    pub fn text_width_1000(&self, text: &str) -> f32 {
        match self.parse_face() {
            Some(face) => {
                let units = face.units_per_em() as f32;
                text.chars()
                    .map(|ch| {
                        face.glyph_index(ch)
                            .and_then(|gid| face.glyph_hor_advance(gid))
                            .map_or_else(|| helvetica_char_width(ch), |adv| adv as f32 / units * 1000.0)
                    })
                    .sum()
            }
            None => text.chars().map(helvetica_char_width).sum(),
        }
    }

    pub fn ascender_ratio(&self) -> f32 {
        self.parse_face()
            .map(|face| face.ascender() as f32 / face.units_per_em() as f32)
            .unwrap_or(0.75)
    }
}

/// Lowercase family name → (file path, face index within TTC)
type FontLookup = HashMap<String, (PathBuf, u32)>;

static FONT_INDEX: OnceLock<FontLookup> = OnceLock::new();

fn font_family_name(face: &Face) -> Option<String> {
    face.names()
        .into_iter()
        .find(|name| name.name_id == ttf_parser::name_id::FAMILY && name.is_unicode())
        .and_then(|name| name.to_string())
}

fn font_directories() -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = Vec::new();

    if let Ok(val) = std::env::var("KISPEC_FONTS") {
        let sep = if cfg!(windows) { ';' } else { ':' };
        dirs.extend(
            val.split(sep)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from),
        );
    }

    #[cfg(target_os = "macos")]
    {
        dirs.extend(["/Library/Fonts".into(), "/System/Library/Fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(home).join("Library/Fonts"));
        }
    }

    #[cfg(target_os = "linux")]
    {
        dirs.extend(["/usr/share/fonts".into(), "/usr/local/share/fonts".into()]);
        if let Ok(home) = std::env::var("HOME") {
            dirs.push(PathBuf::from(&home).join(".local/share/fonts"));
            dirs.push(PathBuf::from(home).join(".fonts"));
        }
    }

    #[cfg(target_os = "windows")]
    {
        match std::env::var("WINDIR") {
            Ok(windir) => dirs.push(PathBuf::from(windir).join("Fonts")),
            Err(_) => dirs.push("C:\\Windows\\Fonts".into()),
        }
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            dirs.push(PathBuf::from(local).join("Microsoft\\Windows\\Fonts"));
        }
    }

    dirs
}

fn font_extension(path: &std::path::Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .filter(|e| matches!(e.as_str(), "ttf" | "otf" | "ttc"))
}

fn scan_font_dirs() -> FontLookup {
    let t0 = std::time::Instant::now();
    let mut index = FontLookup::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();
    let mut files_parsed = 0u32;

    let mut stack = font_directories();
    while let Some(dir) = stack.pop() {
        if !visited.insert(dir.clone()) {
            continue;
        }
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            let Some(ext) = font_extension(&path) else {
                continue;
            };
            let Ok(file) = std::fs::File::open(&path) else {
                continue;
            };
            // SAFETY: font files are only read; a concurrent truncation by
            // another process is tolerated by ttf-parser's bounds checks.
            let Ok(data) = (unsafe { Mmap::map(&file) }) else {
                continue;
            };
            files_parsed += 1;
            let face_count = if ext == "ttc" {
                ttf_parser::fonts_in_collection(&data).unwrap_or(1)
            } else {
                1
            };
            for face_idx in 0..face_count {
                let Ok(face) = Face::parse(&data, face_idx) else {
                    continue;
                };
                // Regular faces win over bold/italic ones of the same family.
                if face.is_bold() || face.is_italic() {
                    continue;
                }
                if let Some(family) = font_family_name(&face) {
                    index
                        .entry(family.to_lowercase())
                        .or_insert((path.clone(), face_idx));
                }
            }
        }
    }

    log::info!(
        "Font scan: {:.1}ms, {} files parsed → {} families",
        t0.elapsed().as_secs_f64() * 1000.0,
        files_parsed,
        index.len(),
    );

    index
}

fn find_font_file(family: &str) -> Option<(PathBuf, u32)> {
    FONT_INDEX
        .get_or_init(scan_font_dirs)
        .get(&family.to_lowercase())
        .cloned()
}

/// Approximate Helvetica advance widths at 1000 units/em.
fn helvetica_char_width(ch: char) -> f32 {
    match ch {
        ' ' => 278.0,
        'I' | 'J' | 'f' | 'i' | 'j' | 'l' | 't' => 278.0,
        'M' | 'm' | 'w' => 833.0,
        'W' => 944.0,
        '0'..='9' => 556.0,
        'A'..='Z' => 667.0,
        'a'..='z' => 556.0,
        '!'..='/' | ':'..='@' | '['..='`' | '{'..='~' => 333.0,
        'Ж' | 'Ш' | 'Щ' | 'Ю' | 'Ы' | 'М' => 833.0,
        'ж' | 'ш' | 'щ' | 'ю' | 'ы' | 'м' => 722.0,
        'А'..='Я' | 'Ё' => 667.0,
        'а'..='я' | 'ё' => 556.0,
        _ => 556.0,
    }
}

/// Map text to single-byte Latin-1 codes for the Helvetica fallback.
/// Characters outside Latin-1 print as `?`.
fn to_latin1_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}

/// A font written into a PDF, ready to encode text for `show` operators.
pub(crate) struct EmbeddedFont {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    char_to_gid: Option<HashMap<char, u16>>,
}

impl EmbeddedFont {
    pub(crate) fn encode(&self, text: &str) -> Vec<u8> {
        match &self.char_to_gid {
            Some(map) => {
                let mut out = Vec::with_capacity(text.len() * 2);
                for ch in text.chars() {
                    let gid = map.get(&ch).copied().unwrap_or(0);
                    out.extend_from_slice(&gid.to_be_bytes());
                }
                out
            }
            None => to_latin1_bytes(text),
        }
    }
}

/// Writes `font` into `pdf`. TrueType faces are subsetted to `used_chars`
/// and embedded as a Type0/CIDFont with Identity-H encoding.
pub(crate) fn embed_font(
    pdf: &mut Pdf,
    font: &Font,
    pdf_name: &str,
    used_chars: &BTreeSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> EmbeddedFont {
    let font_ref = alloc();
    let char_to_gid = font
        .parse_face()
        .and_then(|face| embed_truetype(pdf, font_ref, &font.family, font, &face, used_chars, alloc));

    if char_to_gid.is_none() {
        pdf.type1_font(font_ref)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
    }

    EmbeddedFont {
        pdf_name: pdf_name.to_string(),
        font_ref,
        char_to_gid,
    }
}

fn embed_truetype(
    pdf: &mut Pdf,
    font_ref: Ref,
    family: &str,
    font: &Font,
    face: &Face,
    used_chars: &BTreeSet<char>,
    alloc: &mut impl FnMut() -> Ref,
) -> Option<HashMap<char, u16>> {
    let face_data = font.face.as_ref()?;
    let units = face.units_per_em() as f32;
    let scale = |v: f32| v / units * 1000.0;

    let mut remapper = subsetter::GlyphRemapper::new();
    let mut char_to_gid = HashMap::new();
    let mut gid_widths: Vec<(u16, f32)> = Vec::new();
    for &ch in used_chars {
        if let Some(gid) = face.glyph_index(ch) {
            let new_gid = remapper.remap(gid.0);
            char_to_gid.insert(ch, new_gid);
            let adv = face.glyph_hor_advance(gid).unwrap_or(0);
            gid_widths.push((new_gid, scale(adv as f32)));
        }
    }
    gid_widths.sort_by_key(|&(gid, _)| gid);
    gid_widths.dedup_by_key(|&mut (gid, _)| gid);

    let subset = subsetter::subset(&face_data.data, face_data.index, &remapper).unwrap_or_else(|e| {
        log::warn!("Font subsetting failed for {family}: {e}, embedding full font");
        face_data.data.clone()
    });
    let data_len = i32::try_from(subset.len()).ok()?;

    let ps_name = family.replace(' ', "");
    let descriptor_ref = alloc();
    let data_ref = alloc();
    let cid_font_ref = alloc();
    let tounicode_ref = alloc();

    pdf.stream(data_ref, &subset).pair(Name(b"Length1"), data_len);

    let bb = face.global_bounding_box();
    pdf.font_descriptor(descriptor_ref)
        .name(Name(ps_name.as_bytes()))
        .flags(pdf_writer::types::FontFlags::NON_SYMBOLIC)
        .bbox(Rect::new(
            scale(bb.x_min as f32),
            scale(bb.y_min as f32),
            scale(bb.x_max as f32),
            scale(bb.y_max as f32),
        ))
        .italic_angle(0.0)
        .ascent(scale(face.ascender() as f32))
        .descent(scale(face.descender() as f32))
        .cap_height(face.capital_height().map_or(700.0, |h| scale(h as f32)))
        .stem_v(80.0)
        .font_file2(data_ref);

    let system_info = || pdf_writer::types::SystemInfo {
        registry: pdf_writer::Str(b"Adobe"),
        ordering: pdf_writer::Str(b"Identity"),
        supplement: 0,
    };
    {
        let mut cid = pdf.cid_font(cid_font_ref);
        cid.subtype(pdf_writer::types::CidFontType::Type2);
        cid.base_font(Name(ps_name.as_bytes()));
        cid.system_info(system_info());
        cid.font_descriptor(descriptor_ref);
        cid.default_width(0.0);
        cid.cid_to_gid_map_predefined(Name(b"Identity"));
        if !gid_widths.is_empty() {
            let mut w = cid.widths();
            for &(gid, width) in &gid_widths {
                w.consecutive(gid, [width]);
            }
        }
    }

    let cmap_name = format!("{ps_name}-UTF16");
    let mut cmap = pdf_writer::types::UnicodeCmap::new(Name(cmap_name.as_bytes()), system_info());
    for (&ch, &gid) in &char_to_gid {
        cmap.pair(gid, ch);
    }
    pdf.stream(tounicode_ref, cmap.finish().as_slice());

    pdf.type0_font(font_ref)
        .base_font(Name(ps_name.as_bytes()))
        .encoding_predefined(Name(b"Identity-H"))
        .descendant_font(cid_font_ref)
        .to_unicode(tounicode_ref);

    Some(char_to_gid)
}
