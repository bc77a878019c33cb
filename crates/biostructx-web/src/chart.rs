//! Inline SVG charts: the affinity range bar and the ligand PCA scatter.

use std::fmt::Write;

use biostructx_molecules::clustering::ClusteredLigand;

pub const RANGE_MIN: f64 = -15.0;
pub const RANGE_MAX: f64 = 0.0;

/// (label, from, to, colour), most negative first.
pub const BANDS: [(&str, f64, f64, &str); 4] = [
    ("Strong", -15.0, -10.0, "#ff5733"),
    ("Good", -10.0, -8.0, "#33c4ff"),
    ("Moderate", -8.0, -6.0, "#f4d03f"),
    ("Weak", -6.0, 0.0, "#e74c3c"),
];

const PALETTE: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd",
    "#8c564b", "#e377c2", "#7f7f7f", "#bcbd22", "#17becf",
];

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Horizontal bar over -15..0 kcal/mol with a marker at the prediction.
/// Out-of-range values are pinned to the nearest edge.
pub fn affinity_range_svg(energy: f64) -> String {
    const WIDTH: f64 = 600.0;
    const PAD: f64 = 20.0;
    let span = WIDTH - 2.0 * PAD;
    let x = |v: f64| PAD + (v - RANGE_MIN) / (RANGE_MAX - RANGE_MIN) * span;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} 110" width="100%" role="img" aria-label="Binding affinity range">"#,
        w = WIDTH
    );
    for (label, from, to, colour) in BANDS {
        let _ = write!(
            svg,
            r#"<rect x="{:.1}" y="30" width="{:.1}" height="30" fill="{}" fill-opacity="0.6"><title>{} ({} to {})</title></rect>"#,
            x(from),
            x(to) - x(from),
            colour,
            label,
            from,
            to
        );
        let _ = write!(
            svg,
            r#"<text x="{:.1}" y="24" font-size="11" text-anchor="middle">{}</text>"#,
            (x(from) + x(to)) / 2.0,
            label
        );
    }
    for tick in [-15.0, -10.0, -8.0, -6.0, 0.0] {
        let _ = write!(
            svg,
            r#"<text x="{:.1}" y="76" font-size="10" text-anchor="middle">{}</text>"#,
            x(tick),
            tick
        );
    }

    let marker = x(energy.clamp(RANGE_MIN, RANGE_MAX));
    let _ = write!(
        svg,
        r#"<line x1="{m:.1}" y1="26" x2="{m:.1}" y2="64" stroke="black" stroke-width="2" stroke-dasharray="4 2"/><text x="{m:.1}" y="96" font-size="12" font-weight="bold" text-anchor="middle">Pred: {e:.2}</text>"#,
        m = marker,
        e = energy
    );
    svg.push_str("</svg>");
    svg
}

/// PC1/PC2 scatter coloured by cluster label.
pub fn cluster_scatter_svg(ligands: &[ClusteredLigand]) -> String {
    const WIDTH: f64 = 520.0;
    const HEIGHT: f64 = 380.0;
    const PAD: f64 = 40.0;

    let bounds = |f: fn(&ClusteredLigand) -> f64| {
        let (lo, hi) = ligands
            .iter()
            .map(f)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        if lo.is_finite() && hi > lo { (lo, hi) } else { (lo.min(0.0) - 1.0, hi.max(0.0) + 1.0) }
    };
    let (x_lo, x_hi) = bounds(|l| l.pc1);
    let (y_lo, y_hi) = bounds(|l| l.pc2);
    let sx = |v: f64| PAD + (v - x_lo) / (x_hi - x_lo) * (WIDTH - 2.0 * PAD);
    let sy = |v: f64| HEIGHT - PAD - (v - y_lo) / (y_hi - y_lo) * (HEIGHT - 2.0 * PAD);

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {WIDTH} {HEIGHT}" width="100%" role="img" aria-label="Ligand clusters (PCA)">"#
    );
    let _ = write!(
        svg,
        r##"<rect x="{PAD}" y="{PAD}" width="{}" height="{}" fill="none" stroke="#999"/>"##,
        WIDTH - 2.0 * PAD,
        HEIGHT - 2.0 * PAD
    );
    let _ = write!(
        svg,
        r#"<text x="{}" y="{}" font-size="12" text-anchor="middle">PC1</text><text x="12" y="{}" font-size="12" text-anchor="middle" transform="rotate(-90 12 {})">PC2</text>"#,
        WIDTH / 2.0,
        HEIGHT - 10.0,
        HEIGHT / 2.0,
        HEIGHT / 2.0
    );
    for ligand in ligands {
        let _ = write!(
            svg,
            r##"<circle cx="{:.1}" cy="{:.1}" r="6" fill="{}" stroke="#333"><title>#{} {} (cluster {})</title></circle>"##,
            sx(ligand.pc1),
            sy(ligand.pc2),
            PALETTE[ligand.cluster % PALETTE.len()],
            ligand.index,
            escape(&ligand.smiles),
            ligand.cluster
        );
    }
    svg.push_str("</svg>");
    svg
}
