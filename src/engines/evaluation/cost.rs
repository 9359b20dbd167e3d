use crate::config::CatalogueConfig;
use crate::error::{Result, RetroplanError};
use crate::types::{Building, GeneKind, MaterialCost, GENES_PER_BUILDING};

/// Prices retrofit tasks for the phasing ledger
pub trait CostModel: Send + Sync {
    /// Catalogue entry of material `index` for a gene kind; index 0 keeps the existing element
    fn material(&self, kind: GeneKind, index: u32) -> Result<MaterialCost>;

    /// Price of one labor hour
    fn labor_rate(&self) -> f64 {
        0.0
    }

    /// Surface area times (unit price + labor hours * labor rate); zero for index 0
    fn task_cost(&self, building: &Building, kind: GeneKind, index: u32) -> Result<f64> {
        if index == 0 {
            return Ok(0.0);
        }
        let material = self.material(kind, index)?;
        let unit = material.unit_price + material.labor_hours * self.labor_rate();
        Ok(building.surfaces.get(kind) * unit)
    }
}

/// Cost model backed by the configured catalogue
#[derive(Debug, Clone)]
pub struct CatalogueCostModel {
    catalogue: CatalogueConfig,
}

impl CatalogueCostModel {
    pub fn new(catalogue: CatalogueConfig) -> Self {
        Self { catalogue }
    }
}

impl CostModel for CatalogueCostModel {
    fn material(&self, kind: GeneKind, index: u32) -> Result<MaterialCost> {
        if index == 0 {
            return Ok(MaterialCost {
                unit_price: 0.0,
                labor_hours: 0.0,
            });
        }
        self.catalogue
            .entries(kind)
            .get(index as usize - 1)
            .copied()
            .ok_or_else(|| {
                RetroplanError::CostModel(format!("no {} material with index {}", kind.name(), index))
            })
    }

    fn labor_rate(&self) -> f64 {
        self.catalogue.labor_rate
    }
}

/// Cost of every operational gene, in genome order
pub fn task_costs(model: &dyn CostModel, buildings: &[Building], operational: &[u32]) -> Result<Vec<f64>> {
    operational
        .iter()
        .enumerate()
        .map(|(position, &index)| {
            let building = buildings.get(position / GENES_PER_BUILDING).ok_or_else(|| {
                RetroplanError::CostModel(format!("gene {} has no building", position))
            })?;
            model.task_cost(building, GeneKind::at_position(position), index)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SurfaceAreas;

    fn catalogue() -> CatalogueConfig {
        let entry = |unit_price, labor_hours| MaterialCost { unit_price, labor_hours };
        CatalogueConfig {
            wall: vec![entry(10.0, 1.0), entry(20.0, 0.5)],
            ceiling: vec![entry(5.0, 0.0)],
            floor: vec![entry(8.0, 0.0)],
            window: vec![entry(300.0, 2.0)],
            labor_rate: 40.0,
        }
    }

    #[test]
    fn test_task_costs_follow_surfaces() {
        let model = CatalogueCostModel::new(catalogue());
        let building = Building {
            name: "B".to_string(),
            floor_area: 100.0,
            surfaces: SurfaceAreas {
                wall: 200.0,
                ceiling: 100.0,
                floor: 100.0,
                window: 10.0,
            },
        };

        let costs = task_costs(&model, &[building], &[2, 1, 0, 1]).unwrap();
        // wall: 200 * (20 + 0.5 * 40), window: 10 * (300 + 2 * 40)
        assert_eq!(costs, vec![8000.0, 500.0, 0.0, 3800.0]);
    }

    #[test]
    fn test_unknown_material_is_an_error() {
        let model = CatalogueCostModel::new(catalogue());
        assert!(matches!(model.material(GeneKind::Ceiling, 2), Err(RetroplanError::CostModel(_))));
    }
}
