use crate::bounds::HeightBounds;
use crate::entities::SPInstance;
use crate::error::{Error, Result};
use crate::model::{LinExpr, Model, ModelBuilder, VarId};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thousands::Separable;

/// Non-overlap, containment and height definition
pub mod geometry;

/// Redundant cumulative resource constraint along the vertical axis
pub mod cumulative;

/// Link between the rotation flags and the effective dimensions
pub mod rotation;

/// Lexicographic ordering against the horizontal mirror of a layout
pub mod symmetry;

/// Toggles of the optional parts of the formulation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormulationConfig {
    /// Allow 90° rotation of non-square rectangles
    pub rotation: bool,
    /// Add the redundant cumulative constraint
    pub cumulative: bool,
    /// Add the lexicographic symmetry breaking constraint
    pub symmetry_breaking: bool,
}

impl Default for FormulationConfig {
    fn default() -> Self {
        Self {
            rotation: false,
            cumulative: true,
            symmetry_breaking: true,
        }
    }
}

/// Handles to the decision variables describing the layout.
#[derive(Debug, Clone)]
pub struct PlacementVars {
    pub x: Vec<VarId>,
    pub y: Vec<VarId>,
    /// Constant base width, or a variable when rotation is enabled
    pub eff_width: Vec<LinExpr>,
    /// Constant base height, or a variable when rotation is enabled
    pub eff_height: Vec<LinExpr>,
    /// Present only when rotation is enabled
    pub rotated: Option<Vec<VarId>>,
    pub height: VarId,
}

impl PlacementVars {
    pub fn n_items(&self) -> usize {
        self.x.len()
    }
}

/// A finished model together with the handles needed to decode its assignments.
#[derive(Debug, Clone)]
pub struct Formulation {
    pub model: Model,
    pub vars: PlacementVars,
    pub bounds: HeightBounds,
    pub config: FormulationConfig,
}

/// Translates the instance into an abstract model minimizing the used strip height.
pub fn formulate(instance: &SPInstance, config: &FormulationConfig) -> Result<Formulation> {
    let bounds = HeightBounds::compute(instance);
    let width = to_i64(instance.width, "strip width")?;
    let mut builder = ModelBuilder::new(to_i64(bounds.big_m(instance.width), "big-M")?);

    let vars = declare_vars(&mut builder, instance, &bounds, config.rotation)?;

    geometry::add_containment(&mut builder, &vars, width);
    geometry::add_non_overlap(&mut builder, &vars);
    geometry::add_height_definition(&mut builder, &vars);
    if config.rotation {
        rotation::add_rotation_link(&mut builder, instance, &vars)?;
    }
    if config.cumulative {
        cumulative::add_cumulative(&mut builder, &vars, width);
    }
    if config.symmetry_breaking {
        symmetry::add_symmetry_breaking(&mut builder, &vars, width);
    }
    builder.minimize(vars.height);

    let model = builder.build()?;
    for (kind, count) in model.count_by_kind() {
        debug!("[FORM] {count} {kind} constraint(s)");
    }
    info!(
        "[FORM] {} rectangles formulated: {} variables, {} constraints, height in [{}, {}]",
        instance.n_items(),
        model.variables().len().separate_with_commas(),
        model.constraints().len().separate_with_commas(),
        bounds.lower,
        bounds.upper
    );

    Ok(Formulation {
        model,
        vars,
        bounds,
        config: *config,
    })
}

fn declare_vars(
    builder: &mut ModelBuilder,
    instance: &SPInstance,
    bounds: &HeightBounds,
    rotation: bool,
) -> Result<PlacementVars> {
    let width = to_i64(instance.width, "strip width")?;
    let upper = to_i64(bounds.upper, "height upper bound")?;
    let lower = to_i64(bounds.lower, "height lower bound")?;

    let n = instance.n_items();
    let x = (0..n)
        .map(|i| builder.int_var(format!("x_{i}"), 0, width))
        .collect();
    let y = (0..n)
        .map(|i| builder.int_var(format!("y_{i}"), 0, upper))
        .collect();

    let (eff_width, eff_height, rotated) = match rotation {
        false => {
            let ws = instance
                .base_widths()
                .map(|w| to_i64(w, "rectangle width").map(LinExpr::constant))
                .collect::<Result<Vec<_>>>()?;
            let hs = instance
                .base_heights()
                .map(|h| to_i64(h, "rectangle height").map(LinExpr::constant))
                .collect::<Result<Vec<_>>>()?;
            (ws, hs, None)
        }
        true => {
            let (mut ws, mut hs, mut rs) = (vec![], vec![], vec![]);
            for (i, item) in instance.items().iter().enumerate() {
                let lo = to_i64(item.width.min(item.height), "rectangle dimension")?;
                let hi = to_i64(item.width.max(item.height), "rectangle dimension")?;
                ws.push(LinExpr::var(builder.int_var(format!("w_{i}"), lo, hi)));
                hs.push(LinExpr::var(builder.int_var(format!("h_{i}"), lo, hi)));
                rs.push(builder.bool_var(format!("r_{i}")));
            }
            (ws, hs, Some(rs))
        }
    };

    let height = builder.int_var("height", lower, upper);

    Ok(PlacementVars {
        x,
        y,
        eff_width,
        eff_height,
        rotated,
        height,
    })
}

pub(crate) fn to_i64(value: u64, what: &str) -> Result<i64> {
    i64::try_from(value)
        .map_err(|_| Error::ModelConstruction(format!("{what} {value} does not fit in an i64")))
}
