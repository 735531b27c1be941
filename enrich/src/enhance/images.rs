//! Image orientation classification
//!
//! Portrait and landscape content images get different layout treatment, so
//! every content image is tagged with an exclusive orientation class once its
//! natural pixel dimensions are known. Dimensions come from the markup when
//! the CMS provides width/height attributes, otherwise from an [`ImageProbe`]
//! that inspects the asset bytes (the same header-only read the rest of the
//! toolchain uses via `imagesize`).
//!
//! Images whose dimensions cannot be resolved yet (remote assets, files not
//! synced) are reported as pending; the next pipeline run over the same
//! markup classifies them once the asset is available.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::PathBuf;

use kuchikiki::NodeRef;

use crate::dom;

use super::{classes, Context, Transform, TransformError};

/// Resolver for an image's natural pixel dimensions.
pub trait ImageProbe {
    /// `(width, height)` in pixels, or `None` when unknown.
    fn dimensions(&self, src: &str) -> Option<(u32, u32)>;
}

/// Probe that never resolves; classification then relies on markup
/// attributes alone.
pub struct NullProbe;

impl ImageProbe for NullProbe {
    fn dimensions(&self, _src: &str) -> Option<(u32, u32)> {
        None
    }
}

/// Probe backed by the local asset directory plus inline data URIs.
///
/// Remote (`http`/`https`/protocol-relative) sources are left unresolved on
/// purpose: they belong to a later run, once the asset exists locally.
pub struct FsProbe {
    root: Option<PathBuf>,
}

impl FsProbe {
    /// Create a probe resolving site-absolute paths against `root`.
    pub fn new(root: Option<String>) -> Self {
        Self {
            root: root.map(PathBuf::from),
        }
    }
}

impl ImageProbe for FsProbe {
    fn dimensions(&self, src: &str) -> Option<(u32, u32)> {
        if let Some(rest) = src.strip_prefix("data:") {
            return data_uri_dimensions(rest);
        }
        if src.starts_with("http://") || src.starts_with("https://") || src.starts_with("//") {
            return None;
        }

        let root = self.root.as_ref()?;
        let path = src.trim_start_matches('/');
        let path = path.split(['?', '#']).next().unwrap_or(path);
        let bytes = match std::fs::read(root.join(path)) {
            Ok(bytes) => bytes,
            Err(e) => {
                log::debug!("could not read image asset {}: {}", src, e);
                return None;
            }
        };
        blob_dimensions(&bytes)
    }
}

fn data_uri_dimensions(rest: &str) -> Option<(u32, u32)> {
    let (meta, payload) = rest.split_once(',')?;
    if !meta.ends_with(";base64") {
        return None;
    }
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    blob_dimensions(&bytes)
}

fn blob_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    match imagesize::blob_size(bytes) {
        Ok(size) => Some((size.width as u32, size.height as u32)),
        Err(e) => {
            log::debug!("could not read image dimensions: {}", e);
            None
        }
    }
}

/// Applies `img-landscape` / `img-portrait` to content images.
pub struct ImageOrientationClassifier;

/// Dimensions declared in the markup, when both attributes parse.
fn attr_dimensions(img: &NodeRef) -> Option<(u32, u32)> {
    let width: u32 = dom::get_attr(img, "width")?.trim().parse().ok()?;
    let height: u32 = dom::get_attr(img, "height")?.trim().parse().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some((width, height))
}

impl Transform for ImageOrientationClassifier {
    fn id(&self) -> &'static str {
        "image-orientation"
    }

    fn apply(&self, ctx: &mut Context<'_>) -> Result<(), TransformError> {
        for img in ctx.select("img")? {
            // avatar and icon images are pipeline output, not content
            if dom::has_class(&img, classes::QUOTE_AUTHOR_AVATAR)
                || dom::has_class(&img, classes::CHECK_ICON)
            {
                continue;
            }
            let Some(src) = dom::get_attr(&img, "src") else {
                continue;
            };

            let dims = attr_dimensions(&img).or_else(|| ctx.probe.dimensions(&src));
            let Some((width, height)) = dims else {
                ctx.pending_images.push(src);
                continue;
            };

            let (apply, remove) = if width >= height {
                (classes::IMG_LANDSCAPE, classes::IMG_PORTRAIT)
            } else {
                (classes::IMG_PORTRAIT, classes::IMG_LANDSCAPE)
            };

            let already_correct =
                dom::has_class(&img, apply) && !dom::has_class(&img, remove);
            dom::remove_class(&img, remove);
            dom::add_class(&img, apply);
            if !already_correct {
                ctx.note_changed();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enhance::testutil::{apply, apply_with_probe, fixture};
    use base64::Engine as _;
    use std::collections::HashMap;

    struct MapProbe(HashMap<String, (u32, u32)>);

    impl ImageProbe for MapProbe {
        fn dimensions(&self, src: &str) -> Option<(u32, u32)> {
            self.0.get(src).copied()
        }
    }

    /// Header-only PNG: signature + IHDR is all a dimension probe reads.
    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
        bytes.extend_from_slice(&[0, 0, 0, 0]);
        bytes
    }

    #[test]
    fn test_classifies_from_markup_attributes() {
        let fx = fixture(
            "<img src=\"/a.png\" width=\"800\" height=\"600\">\
             <img src=\"/b.png\" width=\"600\" height=\"800\">",
        );
        let result = apply(&ImageOrientationClassifier, &fx);
        assert_eq!(result.changed, 2);

        let a = fx.container.select_first("img[src=\"/a.png\"]").unwrap();
        assert!(crate::dom::has_class(a.as_node(), "img-landscape"));
        let b = fx.container.select_first("img[src=\"/b.png\"]").unwrap();
        assert!(crate::dom::has_class(b.as_node(), "img-portrait"));
    }

    #[test]
    fn test_square_counts_as_landscape() {
        let fx = fixture("<img src=\"/sq.png\" width=\"400\" height=\"400\">");
        apply(&ImageOrientationClassifier, &fx);
        let img = fx.container.select_first("img").unwrap();
        assert!(crate::dom::has_class(img.as_node(), "img-landscape"));
    }

    #[test]
    fn test_orientation_classes_are_exclusive() {
        // stale class from a previous content version is replaced
        let fx = fixture(
            "<img class=\"img-landscape\" src=\"/p.png\" width=\"300\" height=\"900\">",
        );
        let result = apply(&ImageOrientationClassifier, &fx);
        assert_eq!(result.changed, 1);
        let img = fx.container.select_first("img").unwrap();
        assert!(crate::dom::has_class(img.as_node(), "img-portrait"));
        assert!(!crate::dom::has_class(img.as_node(), "img-landscape"));
    }

    #[test]
    fn test_probe_resolves_missing_attributes() {
        let fx = fixture("<img src=\"/photo.jpg\">");
        let mut map = HashMap::new();
        map.insert("/photo.jpg".to_string(), (1200u32, 675u32));
        let result = apply_with_probe(&ImageOrientationClassifier, &fx, &MapProbe(map));
        assert_eq!(result.changed, 1);
        assert!(result.pending.is_empty());
        let img = fx.container.select_first("img").unwrap();
        assert!(crate::dom::has_class(img.as_node(), "img-landscape"));
    }

    #[test]
    fn test_unresolved_image_is_reported_pending() {
        let fx = fixture("<img src=\"https://cdn.example.com/late.jpg\">");
        let result = apply(&ImageOrientationClassifier, &fx);
        assert_eq!(result.changed, 0);
        assert_eq!(result.pending, vec!["https://cdn.example.com/late.jpg"]);
    }

    #[test]
    fn test_avatar_and_icon_images_are_excluded() {
        let fx = fixture(
            "<img class=\"quote-author-avatar\" src=\"/jane.jpg\">\
             <img class=\"check-icon\" src=\"/check.svg\">",
        );
        let result = apply(&ImageOrientationClassifier, &fx);
        assert_eq!(result.changed, 0);
        assert!(result.pending.is_empty());
    }

    #[test]
    fn test_is_idempotent() {
        let fx = fixture("<img src=\"/a.png\" width=\"800\" height=\"600\">");
        apply(&ImageOrientationClassifier, &fx);
        let once = crate::dom::to_html(&fx.container);

        let second = apply(&ImageOrientationClassifier, &fx);
        assert_eq!(second.changed, 0);
        assert_eq!(crate::dom::to_html(&fx.container), once);
    }

    #[test]
    fn test_fs_probe_reads_data_uri() {
        let payload = STANDARD.encode(png_bytes(640, 480));
        let src = format!("data:image/png;base64,{}", payload);
        let probe = FsProbe::new(None);
        assert_eq!(probe.dimensions(&src), Some((640, 480)));
    }

    #[test]
    fn test_fs_probe_reads_asset_file() {
        let dir = std::env::temp_dir().join("enrich-probe-test");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("tall.png"), png_bytes(200, 900)).unwrap();

        let probe = FsProbe::new(Some(dir.to_string_lossy().into_owned()));
        assert_eq!(probe.dimensions("/tall.png"), Some((200, 900)));
        assert_eq!(probe.dimensions("/absent.png"), None);
    }

    #[test]
    fn test_fs_probe_leaves_remote_sources_unresolved() {
        let probe = FsProbe::new(Some(".".to_string()));
        assert_eq!(probe.dimensions("https://cdn.example.com/x.jpg"), None);
    }
}
