use crate::entities::{SPInstance, SPSolution};
use crate::io::ext_repr::{ExtInstance, ExtPlacement, ExtSolution};
use crate::solver::SolveStatus;
use std::path::Path;

/// Written instead of a layout when the instance was proven infeasible
pub const NO_SOLUTION: &str = "No solution";
/// Written instead of a layout when time ran out before any layout was found
pub const TIME_EXPIRED: &str = "Time expired";

/// Renders a solution in the plain text result format:
///
/// ```text
/// <width> <height>
/// <n>
/// <effW> <effH> <x> <y> [Rotated|Not rotated]
/// ...
/// ----------
/// ==========
/// <elapsed seconds>
/// ```
///
/// The rotation suffix is only present if rotation was permitted.
pub fn format_result(solution: &SPSolution) -> String {
    let Some(packing) = &solution.packing else {
        return match solution.status {
            SolveStatus::Infeasible => NO_SOLUTION.to_string(),
            _ => TIME_EXPIRED.to_string(),
        };
    };

    let mut out = format!(
        "{} {}\n{}\n",
        packing.width,
        packing.height,
        packing.placements.len()
    );
    for p in &packing.placements {
        let suffix = match (solution.rotation, p.rotated) {
            (false, _) => "",
            (true, true) => "Rotated",
            (true, false) => "Not rotated",
        };
        out.push_str(&format!("{} {} {} {} {suffix}\n", p.width, p.height, p.x, p.y));
    }
    out.push_str("----------\n==========\n");
    out.push_str(&float_repr(solution.elapsed.as_secs_f64()));
    out
}

/// Writes the text result of a solution to `path`.
pub fn write_result(solution: &SPSolution, path: &Path) -> std::io::Result<()> {
    std::fs::write(path, format_result(solution))
}

/// Exports a solution out of the library
pub fn export(instance: &SPInstance, solution: &SPSolution) -> ExtSolution {
    let placements = solution
        .packing
        .iter()
        .flat_map(|p| &p.placements)
        .map(|p| ExtPlacement {
            x: p.x,
            y: p.y,
            width: p.width,
            height: p.height,
            rotated: p.rotated,
        })
        .collect();

    ExtSolution {
        strip_width: instance.width,
        height: solution.height(),
        status: solution.status,
        density: solution.packing.as_ref().map(|p| p.density(instance)),
        rotation: solution.rotation,
        backend: solution.backend.clone(),
        run_time_sec: solution.elapsed.as_secs_f64(),
        placements,
    }
}

/// Exports an instance out of the library, under the given name
pub fn export_instance(instance: &SPInstance, name: &str) -> ExtInstance {
    ExtInstance {
        name: name.to_string(),
        strip_width: instance.width,
        widths: instance.base_widths().collect(),
        heights: instance.base_heights().collect(),
    }
}

/// Shortest representation of a float which reads back to the same value, in the notation
/// used by most scripting languages: always a fractional part or an exponent, scientific
/// notation below `1e-4` and from `1e16` on.
pub fn float_repr(value: f64) -> String {
    if !value.is_finite() {
        return match value {
            v if v.is_nan() => "nan".into(),
            v if v > 0.0 => "inf".into(),
            _ => "-inf".into(),
        };
    }
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let sci = format!("{value:e}");
        let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        let (sign, digits) = match exponent.strip_prefix('-') {
            Some(digits) => ('-', digits),
            None => ('+', exponent),
        };
        return format!("{mantissa}e{sign}{digits:0>2}");
    }
    let plain = format!("{value}");
    match plain.contains('.') {
        true => plain,
        false => plain + ".0",
    }
}
