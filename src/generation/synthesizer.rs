//! Procedural Synthesizer
//!
//! Builds a self-contained magazine-cutout SVG: torn paper edges, paper
//! texture, drop shadow, optional tape and staple, a per-type motif and a
//! label. No I/O; every call may differ visually.

use std::fmt::Write as _;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{Bounds, PlaceholderConfig, RandomizationConfig, SvgConfig};
use crate::error::{PlaceholderError, Result};
use crate::generation::randomizer::sample_within;
use crate::models::{Aesthetic, ContentCategory, ResolvedConfig};

/// Points sampled along each side of the torn outline
const POINTS_PER_SIDE: usize = 20;
/// Maximum inward jitter of the torn outline, in pixels
const EDGE_JITTER_PX: f64 = 8.0;
/// Tape strip tilt, in degrees
const TAPE_TILT: Bounds = Bounds::new(-15.0, 15.0);

pub const SVG_DATA_URI_PREFIX: &str = "data:image/svg+xml;base64,";

/// Stateless SVG builder over a resolved request.
#[derive(Debug, Clone)]
pub struct ProceduralSynthesizer {
    svg: SvgConfig,
    randomization: RandomizationConfig,
}

impl ProceduralSynthesizer {
    pub fn new(svg: SvgConfig, randomization: RandomizationConfig) -> Self {
        Self { svg, randomization }
    }

    pub fn from_config(config: &PlaceholderConfig) -> Self {
        Self::new(config.svg.clone(), config.randomization.clone())
    }

    /// Renders a placeholder and returns it as a base64 `data:` URI.
    pub fn synthesize(&self, config: &ResolvedConfig, aesthetic: &Aesthetic) -> Result<String> {
        self.synthesize_with(config, aesthetic, &mut rand::thread_rng())
    }

    pub fn synthesize_with<R: Rng + ?Sized>(
        &self,
        config: &ResolvedConfig,
        aesthetic: &Aesthetic,
        rng: &mut R,
    ) -> Result<String> {
        let svg = self.render_svg(config, aesthetic, rng)?;
        Ok(to_data_uri(&svg))
    }

    /// Renders the raw SVG document.
    pub fn render_svg<R: Rng + ?Sized>(
        &self,
        config: &ResolvedConfig,
        aesthetic: &Aesthetic,
        rng: &mut R,
    ) -> Result<String> {
        let paper = self
            .svg
            .paper_colors
            .choose(rng)
            .ok_or_else(|| PlaceholderError::Internal("paper palette is empty".to_string()))?;
        let accent = self
            .svg
            .decoration_colors
            .choose(rng)
            .ok_or_else(|| PlaceholderError::Internal("decoration palette is empty".to_string()))?;

        let width = config.width as f64;
        let height = config.height as f64;
        let (cx, cy) = (width / 2.0, height / 2.0);
        let outline = torn_outline(width, height, rng);
        let noise_seed: u32 = rng.gen_range(0..10_000);

        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = config.width,
            h = config.height
        );

        svg.push_str("<defs>");
        let _ = write!(svg, r#"<clipPath id="torn-edge"><polygon points="{}"/></clipPath>"#, outline);
        let _ = write!(
            svg,
            concat!(
                r#"<filter id="paper-texture" x="0" y="0" width="100%" height="100%">"#,
                r#"<feTurbulence type="fractalNoise" baseFrequency="0.04" numOctaves="4" seed="{seed}" result="noise"/>"#,
                r#"<feDiffuseLighting in="noise" lighting-color="{paper}" surfaceScale="1.5" result="light">"#,
                r#"<feDistantLight azimuth="45" elevation="55"/></feDiffuseLighting>"#,
                r#"<feBlend in="SourceGraphic" in2="light" mode="multiply"/></filter>"#
            ),
            seed = noise_seed,
            paper = escape_xml(paper)
        );
        svg.push_str(concat!(
            r#"<filter id="drop-shadow" x="-10%" y="-10%" width="130%" height="130%">"#,
            r##"<feDropShadow dx="3" dy="4" stdDeviation="3" flood-color="#000000" flood-opacity="0.35"/></filter>"##
        ));
        svg.push_str("</defs>");

        let _ = write!(
            svg,
            r#"<g transform="rotate({:.2} {:.1} {:.1})">"#,
            aesthetic.rotation, cx, cy
        );
        svg.push_str(r#"<g filter="url(#drop-shadow)"><g clip-path="url(#torn-edge)">"#);
        let _ = write!(
            svg,
            r#"<rect width="{}" height="{}" fill="{}" filter="url(#paper-texture)"/>"#,
            config.width,
            config.height,
            escape_xml(paper)
        );
        svg.push_str(&motif(config.category, width, height, &escape_xml(accent)));
        svg.push_str(&self.label(config.category, width, height));
        svg.push_str("</g></g>");

        if aesthetic.has_decorations {
            if rng.gen_bool(self.tape_share()) {
                svg.push_str(&self.tape(width, height, rng));
            } else {
                svg.push_str(&staple(width, height, rng));
            }
        }

        svg.push_str("</g></svg>");
        Ok(svg)
    }

    /// Odds that a decorated card gets tape rather than a staple.
    ///
    /// Combined with the randomizer drawing `has_decorations` at
    /// `tape_chance + staple_chance`, each kind keeps its configured rate.
    fn tape_share(&self) -> f64 {
        let tape = probability(self.randomization.tape_chance);
        let staple = probability(self.randomization.staple_chance);
        if tape + staple > 0.0 {
            tape / (tape + staple)
        } else {
            1.0
        }
    }

    fn label(&self, category: ContentCategory, width: f64, height: f64) -> String {
        let font_size = (width.min(height) / 14.0).clamp(10.0, 48.0);
        format!(
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-family="Georgia, serif" font-size="{:.1}" fill="{}">{}</text>"#,
            width / 2.0,
            height * 0.8,
            font_size,
            escape_xml(&self.svg.text_color),
            escape_xml(self.svg.message_for(category))
        )
    }

    fn tape<R: Rng + ?Sized>(&self, width: f64, height: f64, rng: &mut R) -> String {
        let tape_w = sample_within(rng, Bounds::new(width * 0.2, width * 0.35));
        let tape_h = (height * 0.08).clamp(12.0, 32.0);
        let x = sample_within(rng, Bounds::new(0.0, width - tape_w));
        let y = sample_within(rng, Bounds::new(-tape_h / 2.0, height * 0.15));
        let tilt = sample_within(rng, TAPE_TILT);

        format!(
            r#"<rect class="tape" x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="{}" fill-opacity="0.65" transform="rotate({:.1} {:.1} {:.1})"/>"#,
            x,
            y,
            tape_w,
            tape_h,
            escape_xml(&self.svg.tape_color),
            tilt,
            x + tape_w / 2.0,
            y + tape_h / 2.0
        )
    }
}

/// Closed polygon along the canvas border with inward jitter on every point.
fn torn_outline<R: Rng + ?Sized>(width: f64, height: f64, rng: &mut R) -> String {
    let mut points: Vec<(f64, f64)> = Vec::with_capacity(POINTS_PER_SIDE * 4);

    for i in 0..POINTS_PER_SIDE {
        let t = i as f64 / POINTS_PER_SIDE as f64;
        points.push((width * t, jitter(rng)));
    }
    for i in 0..POINTS_PER_SIDE {
        let t = i as f64 / POINTS_PER_SIDE as f64;
        points.push((width - jitter(rng), height * t));
    }
    for i in 0..POINTS_PER_SIDE {
        let t = i as f64 / POINTS_PER_SIDE as f64;
        points.push((width - width * t, height - jitter(rng)));
    }
    for i in 0..POINTS_PER_SIDE {
        let t = i as f64 / POINTS_PER_SIDE as f64;
        points.push((jitter(rng), height - height * t));
    }

    points
        .iter()
        .map(|(x, y)| format!("{:.1},{:.1}", x, y))
        .collect::<Vec<_>>()
        .join(" ")
}

fn jitter<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen_range(0.0..=EDGE_JITTER_PX)
}

fn probability(chance: f64) -> f64 {
    if chance.is_nan() {
        0.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}

fn staple<R: Rng + ?Sized>(width: f64, height: f64, rng: &mut R) -> String {
    let x = sample_within(rng, Bounds::new(width * 0.1, width * 0.9 - 16.0));
    let y = sample_within(rng, Bounds::new(height * 0.05, height * 0.2));
    format!(
        concat!(
            r#"<g class="staple" transform="translate({:.1} {:.1})">"#,
            r##"<path d="M0 3 V0 H16 V3" fill="none" stroke="#8c8c8c" stroke-width="2" stroke-linecap="round"/>"##,
            "</g>"
        ),
        x, y
    )
}

/// Simple geometric figure per content type, centered above the label.
fn motif(category: ContentCategory, width: f64, height: f64, color: &str) -> String {
    let size = width.min(height) * 0.22;
    let cx = width / 2.0;
    let cy = height * 0.45;

    match category {
        ContentCategory::Character => format!(
            concat!(
                r#"<g class="motif" fill="{c}" fill-opacity="0.85">"#,
                r#"<circle cx="{x:.1}" cy="{hy:.1}" r="{hr:.1}"/>"#,
                r#"<path d="M{l:.1} {b:.1} Q{x:.1} {t:.1} {r:.1} {b:.1} Z"/></g>"#
            ),
            c = color,
            x = cx,
            hy = cy - size * 0.45,
            hr = size * 0.35,
            l = cx - size * 0.7,
            r = cx + size * 0.7,
            t = cy - size * 0.2,
            b = cy + size * 0.7
        ),
        ContentCategory::Location => format!(
            concat!(
                r#"<g class="motif" fill="{c}" fill-opacity="0.85">"#,
                r#"<polygon points="{x0:.1},{b:.1} {x1:.1},{p1:.1} {x2:.1},{m:.1} {x3:.1},{p2:.1} {x4:.1},{b:.1}"/>"#,
                r#"<circle cx="{sx:.1}" cy="{sy:.1}" r="{sr:.1}" fill-opacity="0.5"/></g>"#
            ),
            c = color,
            x0 = cx - size * 1.2,
            x1 = cx - size * 0.5,
            x2 = cx,
            x3 = cx + size * 0.6,
            x4 = cx + size * 1.2,
            b = cy + size * 0.6,
            p1 = cy - size * 0.5,
            m = cy + size * 0.1,
            p2 = cy - size * 0.7,
            sx = cx + size * 0.9,
            sy = cy - size * 0.9,
            sr = size * 0.2
        ),
        ContentCategory::Event => {
            let points = (0..10)
                .map(|i| {
                    let radius = if i % 2 == 0 { size } else { size * 0.45 };
                    let angle = std::f64::consts::PI / 5.0 * i as f64 - std::f64::consts::FRAC_PI_2;
                    format!("{:.1},{:.1}", cx + radius * angle.cos(), cy + radius * angle.sin())
                })
                .collect::<Vec<_>>()
                .join(" ");
            format!(
                r#"<g class="motif"><polygon points="{}" fill="{}" fill-opacity="0.85"/></g>"#,
                points, color
            )
        }
        ContentCategory::Item => format!(
            r#"<g class="motif"><polygon points="{:.1},{:.1} {:.1},{:.1} {:.1},{:.1} {:.1},{:.1}" fill="{}" fill-opacity="0.85"/></g>"#,
            cx,
            cy - size,
            cx + size * 0.7,
            cy,
            cx,
            cy + size,
            cx - size * 0.7,
            cy,
            color
        ),
        ContentCategory::Avatar => format!(
            concat!(
                r#"<g class="motif" fill="{c}" fill-opacity="0.85">"#,
                r#"<circle cx="{x:.1}" cy="{y:.1}" r="{r:.1}" fill="none" stroke="{c}" stroke-width="{sw:.1}"/>"#,
                r#"<circle cx="{x:.1}" cy="{hy:.1}" r="{hr:.1}"/></g>"#
            ),
            c = color,
            x = cx,
            y = cy,
            r = size,
            sw = (size * 0.08).max(1.0),
            hy = cy - size * 0.15,
            hr = size * 0.4
        ),
        ContentCategory::Banner => {
            let stripe_h = size * 0.25;
            let stripes = (0..3)
                .map(|i| {
                    format!(
                        r#"<rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill-opacity="{:.2}"/>"#,
                        width * 0.15,
                        cy - size * 0.6 + i as f64 * stripe_h * 1.6,
                        width * 0.7,
                        stripe_h,
                        0.85 - i as f64 * 0.2
                    )
                })
                .collect::<String>();
            format!(r#"<g class="motif" fill="{}">{}</g>"#, color, stripes)
        }
    }
}

pub fn to_data_uri(svg: &str) -> String {
    format!("{}{}", SVG_DATA_URI_PREFIX, STANDARD.encode(svg.as_bytes()))
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlaceholderRequest;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn resolved(category: ContentCategory, width: u32, height: u32) -> ResolvedConfig {
        ResolvedConfig::resolve(
            &PlaceholderRequest::new(category).with_size(width, height),
            &PlaceholderConfig::default(),
        )
    }

    fn aesthetic(rotation: f64) -> Aesthetic {
        Aesthetic {
            rotation,
            ..Aesthetic::neutral()
        }
    }

    fn decode(uri: &str) -> String {
        let payload = uri.strip_prefix(SVG_DATA_URI_PREFIX).expect("svg data uri");
        String::from_utf8(STANDARD.decode(payload).unwrap()).unwrap()
    }

    #[test]
    fn test_synthesize_returns_decodable_data_uri() {
        let synthesizer = ProceduralSynthesizer::from_config(&PlaceholderConfig::default());
        let uri = synthesizer
            .synthesize(&resolved(ContentCategory::Character, 400, 300), &aesthetic(2.5))
            .unwrap();

        let svg = decode(&uri);
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains(r#"width="400" height="300""#));
        assert!(svg.contains(r#"<g transform="rotate(2.50 200.0 150.0)">"#));
        assert!(svg.contains("Character coming soon"));
    }

    #[test]
    fn test_torn_outline_has_eighty_points_within_canvas() {
        let mut rng = StdRng::seed_from_u64(5);
        let outline = torn_outline(400.0, 300.0, &mut rng);
        let points: Vec<(f64, f64)> = outline
            .split(' ')
            .map(|pair| {
                let (x, y) = pair.split_once(',').unwrap();
                (x.parse().unwrap(), y.parse().unwrap())
            })
            .collect();

        assert_eq!(points.len(), POINTS_PER_SIDE * 4);
        assert!(points
            .iter()
            .all(|(x, y)| (0.0..=400.0).contains(x) && (0.0..=300.0).contains(y)));
        // top edge hugs y in [0, 8]
        assert!(points[..POINTS_PER_SIDE].iter().all(|(_, y)| *y <= EDGE_JITTER_PX));
    }

    #[test]
    fn test_texture_shadow_and_clip_present() {
        let synthesizer = ProceduralSynthesizer::from_config(&PlaceholderConfig::default());
        let mut rng = StdRng::seed_from_u64(11);
        let svg = synthesizer
            .render_svg(&resolved(ContentCategory::Location, 800, 600), &aesthetic(0.0), &mut rng)
            .unwrap();

        assert!(svg.contains(r#"<clipPath id="torn-edge">"#));
        assert!(svg.contains("feTurbulence"));
        assert!(svg.contains("feDiffuseLighting"));
        assert!(svg.contains("feDropShadow"));
        assert!(svg.contains(r#"class="motif""#));
    }

    fn decorated(rotation: f64) -> Aesthetic {
        Aesthetic {
            has_decorations: true,
            ..aesthetic(rotation)
        }
    }

    #[test]
    fn test_undecorated_aesthetic_draws_nothing() {
        let mut config = PlaceholderConfig::default();
        config.randomization.tape_chance = 1.0;
        config.randomization.staple_chance = 1.0;
        let synthesizer = ProceduralSynthesizer::from_config(&config);
        let request = resolved(ContentCategory::Item, 300, 300);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..50 {
            let plain = synthesizer.render_svg(&request, &aesthetic(0.0), &mut rng).unwrap();
            assert!(!plain.contains(r#"class="tape""#));
            assert!(!plain.contains(r#"class="staple""#));
        }
    }

    #[test]
    fn test_decorated_aesthetic_draws_exactly_one_decoration() {
        let synthesizer = ProceduralSynthesizer::from_config(&PlaceholderConfig::default());
        let request = resolved(ContentCategory::Item, 300, 300);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..50 {
            let svg = synthesizer.render_svg(&request, &decorated(0.0), &mut rng).unwrap();
            let tape = svg.contains(r#"class="tape""#);
            let staple = svg.contains(r#"class="staple""#);
            assert!(tape ^ staple, "expected one decoration in {}", svg);
        }
    }

    #[test]
    fn test_decoration_kind_follows_chances() {
        let mut config = PlaceholderConfig::default();
        config.randomization.tape_chance = 0.4;
        config.randomization.staple_chance = 0.0;
        let tape_only = ProceduralSynthesizer::from_config(&config);

        config.randomization.tape_chance = 0.0;
        config.randomization.staple_chance = 0.2;
        let staple_only = ProceduralSynthesizer::from_config(&config);

        let request = resolved(ContentCategory::Item, 300, 300);
        let mut rng = StdRng::seed_from_u64(9);

        let svg = tape_only.render_svg(&request, &decorated(0.0), &mut rng).unwrap();
        assert!(svg.contains(r#"class="tape""#));
        let svg = staple_only.render_svg(&request, &decorated(0.0), &mut rng).unwrap();
        assert!(svg.contains(r#"class="staple""#));
    }

    #[test]
    fn test_every_category_renders() {
        let synthesizer = ProceduralSynthesizer::from_config(&PlaceholderConfig::default());
        let mut rng = StdRng::seed_from_u64(17);
        for category in ContentCategory::ALL {
            let svg = synthesizer
                .render_svg(&resolved(category, 200, 200), &aesthetic(-1.0), &mut rng)
                .unwrap();
            assert!(svg.contains(r#"class="motif""#), "{} has no motif", category);
        }
    }

    #[test]
    fn test_unknown_label_uses_default_message() {
        let synthesizer = ProceduralSynthesizer::from_config(&PlaceholderConfig::default());
        let mut rng = StdRng::seed_from_u64(1);
        let svg = synthesizer
            .render_svg(&resolved(ContentCategory::Banner, 1200, 400), &aesthetic(0.0), &mut rng)
            .unwrap();
        assert!(svg.contains(">Coming soon</text>"));
    }

    #[test]
    fn test_label_is_escaped() {
        let mut config = PlaceholderConfig::default();
        config
            .svg
            .messages
            .insert(ContentCategory::Item, "Tools & <gadgets>".to_string());
        let synthesizer = ProceduralSynthesizer::from_config(&config);
        let mut rng = StdRng::seed_from_u64(1);
        let svg = synthesizer
            .render_svg(&resolved(ContentCategory::Item, 300, 300), &aesthetic(0.0), &mut rng)
            .unwrap();
        assert!(svg.contains("Tools &amp; &lt;gadgets&gt;"));
    }

    #[test]
    fn test_empty_palette_is_an_error() {
        let mut config = PlaceholderConfig::default();
        config.svg.paper_colors.clear();
        let synthesizer = ProceduralSynthesizer::from_config(&config);

        let result = synthesizer.synthesize(&resolved(ContentCategory::Item, 300, 300), &aesthetic(0.0));
        assert!(matches!(result, Err(PlaceholderError::Internal(_))));
    }

    #[test]
    fn test_tiny_canvas_renders() {
        let mut config = PlaceholderConfig::default();
        config.randomization.tape_chance = 1.0;
        config.randomization.staple_chance = 1.0;
        let synthesizer = ProceduralSynthesizer::from_config(&config);
        let mut rng = StdRng::seed_from_u64(8);
        let svg = synthesizer
            .render_svg(&resolved(ContentCategory::Avatar, 1, 1), &aesthetic(0.0), &mut rng)
            .unwrap();
        assert!(svg.contains(r#"viewBox="0 0 1 1""#));
    }
}
