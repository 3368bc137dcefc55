use crate::entities::{Packing, SPInstance};
use crate::solver::SolveStatus;
use serde::{Deserialize, Serialize};
use svg::Document;
use svg::node::element::{Group, Rectangle, Text, Title};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct SvgDrawOptions {
    #[serde(default)]
    pub theme: SvgLayoutThemes,
    /// Draws the index of every rectangle at its center
    #[serde(default)]
    pub item_labels: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SvgLayoutThemes {
    #[default]
    EarthTones,
    Gray,
}

impl SvgLayoutThemes {
    pub fn theme(&self) -> &'static SvgLayoutTheme {
        match self {
            SvgLayoutThemes::EarthTones => &EARTH_TONES_THEME,
            SvgLayoutThemes::Gray => &GRAY_THEME,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SvgLayoutTheme {
    pub stroke_width_multiplier: f64,
    pub strip_fill: &'static str,
    pub item_fills: [&'static str; 8],
    pub item_opacity: f64,
}

pub static EARTH_TONES_THEME: SvgLayoutTheme = SvgLayoutTheme {
    stroke_width_multiplier: 2.0,
    strip_fill: "#F5E6D3",
    item_fills: [
        "#CC824A", "#FFC879", "#8C5A3C", "#D9A066", "#A3B18A", "#588157", "#BC6C25", "#DDA15E",
    ],
    item_opacity: 0.5,
};

pub static GRAY_THEME: SvgLayoutTheme = SvgLayoutTheme {
    stroke_width_multiplier: 2.5,
    strip_fill: "#F0F0F0",
    item_fills: [
        "#8F8F8F", "#636363", "#B0B0B0", "#4A4A4A", "#A3A3A3", "#777777", "#C3C3C3", "#595959",
    ],
    item_opacity: 0.7,
};

/// Draws the packing inside its strip, with the y-axis pointing up.
pub fn packing_to_svg(
    instance: &SPInstance,
    packing: &Packing,
    status: SolveStatus,
    options: SvgDrawOptions,
) -> Document {
    let theme = options.theme.theme();
    let (width, height) = (packing.width as f64, packing.height.max(1) as f64);
    let margin = 0.05 * f64::max(width, height);
    let label_size = 0.04 * f64::max(width, height);
    let stroke_width = f64::min(width, height) * 0.005 * theme.stroke_width_multiplier;

    // flips the y-axis: the strip bottom is at the bottom of the drawing
    let flip = |y: f64, h: f64| height - y - h;

    let strip = Group::new().set("id", "strip").add(
        Rectangle::new()
            .set("x", 0)
            .set("y", 0)
            .set("width", width)
            .set("height", height)
            .set("fill", theme.strip_fill)
            .set("stroke", "black")
            .set("stroke-width", 2.0 * stroke_width)
            .add(Title::new(format!("strip, width: {}, height: {}", packing.width, packing.height))),
    );

    let items = packing
        .placements
        .iter()
        .enumerate()
        .fold(Group::new().set("id", "items"), |group, (i, p)| {
            let (x, y, w, h) = (p.x as f64, p.y as f64, p.width as f64, p.height as f64);
            let mut item = Group::new().set("id", format!("item_{i}")).add(
                Rectangle::new()
                    .set("x", x)
                    .set("y", flip(y, h))
                    .set("width", w)
                    .set("height", h)
                    .set("fill", theme.item_fills[i % theme.item_fills.len()])
                    .set("fill-opacity", theme.item_opacity)
                    .set("stroke", "black")
                    .set("stroke-width", stroke_width)
                    .add(Title::new(format!(
                        "item {i}: {}x{} at ({}, {}){}",
                        p.width,
                        p.height,
                        p.x,
                        p.y,
                        if p.rotated { ", rotated" } else { "" }
                    ))),
            );
            if options.item_labels {
                item = item.add(
                    Text::new(i.to_string())
                        .set("x", x + w / 2.0)
                        .set("y", flip(y, h) + h / 2.0)
                        .set("font-size", label_size)
                        .set("text-anchor", "middle")
                        .set("dominant-baseline", "middle"),
                );
            }
            group.add(item)
        });

    let label = Text::new(format!(
        "w: {} | h: {} | n: {} | density: {:.1}% | {}",
        packing.width,
        packing.height,
        instance.n_items(),
        packing.density(instance) * 100.0,
        status
    ))
    .set("x", 0)
    .set("y", -margin / 2.0)
    .set("font-size", label_size)
    .set("font-family", "monospace");

    let vbox = (-margin, -2.0 * margin, width + 2.0 * margin, height + 3.0 * margin);

    Document::new()
        .set("viewBox", vbox)
        .add(strip)
        .add(items)
        .add(label)
}
