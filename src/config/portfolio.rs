use super::traits::ConfigSection;
use crate::error::RetroplanError;
use crate::types::{
    Building, GeneBounds, GeneKind, MaterialCost, SurfaceAreas, TemporalMode, GENES_PER_BUILDING,
};
use serde::{Deserialize, Serialize};

/// Buildings, decision space and phasing schedule of the retrofit programme
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    /// Ordered: building `i` owns genes `4i..4i+4`
    pub buildings: Vec<Building>,
    pub gene_bounds: GeneBounds,
    pub phase_budgets: Vec<f64>,
    pub temporal_mode: TemporalMode,
    pub constraint_enforcement: bool,
    pub horizon_years: usize,
    pub catalogue: CatalogueConfig,
}

/// Material prices per gene kind. Entry `i - 1` prices material index `i`; index 0 keeps the existing element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogueConfig {
    pub wall: Vec<MaterialCost>,
    pub ceiling: Vec<MaterialCost>,
    pub floor: Vec<MaterialCost>,
    pub window: Vec<MaterialCost>,
    /// Price of one labor hour
    pub labor_rate: f64,
}

impl CatalogueConfig {
    pub fn entries(&self, kind: GeneKind) -> &[MaterialCost] {
        match kind {
            GeneKind::Wall => &self.wall,
            GeneKind::Ceiling => &self.ceiling,
            GeneKind::Floor => &self.floor,
            GeneKind::Window => &self.window,
        }
    }
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        let building = |name: &str, floor_area: f64| Building {
            name: name.to_string(),
            floor_area,
            surfaces: SurfaceAreas::default(),
        };

        Self {
            buildings: vec![
                building("BarreMontreau", 302.0),
                building("TourMontreau", 850.0),
                building("ClotFrancais", 1990.0),
            ],
            gene_bounds: GeneBounds::default(),
            phase_budgets: vec![55_000.0, 55_000.0, 110_000.0, 55_000.0],
            temporal_mode: TemporalMode::Off,
            constraint_enforcement: true,
            horizon_years: 20,
            catalogue: CatalogueConfig::default(),
        }
    }
}

impl PortfolioConfig {
    pub fn operational_genes(&self) -> usize {
        self.buildings.len() * GENES_PER_BUILDING
    }

    /// Largest phase index a reconstructed plan can use
    pub fn max_phase_index(&self) -> usize {
        match self.temporal_mode {
            TemporalMode::Off => 0,
            TemporalMode::Sequenced => self.operational_genes().saturating_sub(1),
            TemporalMode::Phased => self.phase_budgets.len().saturating_sub(1),
        }
    }

    pub fn total_floor_area(&self) -> f64 {
        self.buildings.iter().map(|b| b.floor_area).sum()
    }

    fn validate_catalogue(&self) -> Result<(), RetroplanError> {
        if self.catalogue.labor_rate < 0.0 || !self.catalogue.labor_rate.is_finite() {
            return Err(RetroplanError::Configuration(
                "portfolio.catalogue.labor_rate must be a non-negative number".to_string()
            ));
        }
        for kind in GeneKind::ALL {
            let entries = self.catalogue.entries(kind);
            let needed = self.gene_bounds.get(kind).high.saturating_sub(1) as usize;
            if entries.len() < needed {
                return Err(RetroplanError::Configuration(format!(
                    "portfolio.catalogue.{} has {} entries but material indices up to {} are reachable",
                    kind.name(),
                    entries.len(),
                    needed
                )));
            }
            if entries.iter().any(|m| m.unit_price < 0.0 || m.labor_hours < 0.0) {
                return Err(RetroplanError::Configuration(format!(
                    "portfolio.catalogue.{} contains a negative price or labor time",
                    kind.name()
                )));
            }
        }
        Ok(())
    }
}

impl ConfigSection for PortfolioConfig {
    fn section_name() -> &'static str {
        "portfolio"
    }

    fn validate(&self) -> Result<(), RetroplanError> {
        if self.buildings.is_empty() {
            return Err(RetroplanError::Configuration(
                "portfolio.buildings must list at least one building".to_string()
            ));
        }
        for building in &self.buildings {
            if building.floor_area <= 0.0 || !building.floor_area.is_finite() {
                return Err(RetroplanError::Configuration(format!(
                    "Building {} must have a positive floor area",
                    building.name
                )));
            }
            let surfaces = GeneKind::ALL.map(|kind| building.surfaces.get(kind));
            if surfaces.iter().any(|area| *area < 0.0 || !area.is_finite()) {
                return Err(RetroplanError::Configuration(format!(
                    "Building {} has a negative surface area",
                    building.name
                )));
            }
        }

        for kind in GeneKind::ALL {
            let bound = self.gene_bounds.get(kind);
            if bound.low >= bound.high {
                return Err(RetroplanError::Configuration(format!(
                    "portfolio.gene_bounds.{} must satisfy low < high, got [{}, {})",
                    kind.name(),
                    bound.low,
                    bound.high
                )));
            }
        }

        if self.phase_budgets.iter().any(|b| *b < 0.0 || !b.is_finite()) {
            return Err(RetroplanError::Configuration(
                "portfolio.phase_budgets must all be non-negative".to_string()
            ));
        }

        if self.temporal_mode == TemporalMode::Phased {
            if self.phase_budgets.is_empty() {
                return Err(RetroplanError::Configuration(
                    "portfolio.phase_budgets must not be empty in phased mode".to_string()
                ));
            }
            self.validate_catalogue()?;
        }

        if self.horizon_years < self.max_phase_index() {
            return Err(RetroplanError::Configuration(format!(
                "portfolio.horizon_years ({}) is shorter than the last reachable phase ({})",
                self.horizon_years,
                self.max_phase_index()
            )));
        }

        Ok(())
    }
}
