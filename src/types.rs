use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Range};

/// Integer chromosome: operational genes followed (in temporal mode) by the temporal half.
pub type Genome = Vec<u32>;

/// Number of operational genes per building block.
pub const GENES_PER_BUILDING: usize = 4;

/// Kind of retrofit decision carried by an operational gene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneKind {
    Wall,
    Ceiling,
    Floor,
    Window,
}

impl GeneKind {
    /// Block order of the four genes of one building.
    pub const ALL: [GeneKind; GENES_PER_BUILDING] =
        [GeneKind::Wall, GeneKind::Ceiling, GeneKind::Floor, GeneKind::Window];

    pub fn at_position(position: usize) -> GeneKind {
        Self::ALL[position % GENES_PER_BUILDING]
    }

    pub fn name(&self) -> &'static str {
        match self {
            GeneKind::Wall => "wall",
            GeneKind::Ceiling => "ceiling",
            GeneKind::Floor => "floor",
            GeneKind::Window => "window",
        }
    }
}

/// Whether (and how) a chromosome encodes when each retrofit task is executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalMode {
    Off,
    Sequenced,
    Phased,
}

impl TemporalMode {
    pub fn is_temporal(&self) -> bool {
        !matches!(self, TemporalMode::Off)
    }
}

/// Half-open `[low, high)` range of one gene kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneBound {
    pub low: u32,
    pub high: u32,
}

impl GeneBound {
    pub fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    pub fn range(&self) -> Range<u32> {
        self.low..self.high
    }

    pub fn contains(&self, value: u32) -> bool {
        self.range().contains(&value)
    }
}

/// Bound table, one entry per gene kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneBounds {
    pub wall: GeneBound,
    pub ceiling: GeneBound,
    pub floor: GeneBound,
    pub window: GeneBound,
}

impl GeneBounds {
    pub fn get(&self, kind: GeneKind) -> GeneBound {
        match kind {
            GeneKind::Wall => self.wall,
            GeneKind::Ceiling => self.ceiling,
            GeneKind::Floor => self.floor,
            GeneKind::Window => self.window,
        }
    }
}

impl Default for GeneBounds {
    fn default() -> Self {
        Self {
            wall: GeneBound::new(0, 40),
            ceiling: GeneBound::new(0, 40),
            floor: GeneBound::new(0, 40),
            window: GeneBound::new(0, 4),
        }
    }
}

/// Retrofittable surface areas of a building, in square metres
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SurfaceAreas {
    pub wall: f64,
    pub ceiling: f64,
    pub floor: f64,
    pub window: f64,
}

impl SurfaceAreas {
    pub fn get(&self, kind: GeneKind) -> f64 {
        match kind {
            GeneKind::Wall => self.wall,
            GeneKind::Ceiling => self.ceiling,
            GeneKind::Floor => self.floor,
            GeneKind::Window => self.window,
        }
    }
}

/// Catalogue price of one material choice
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaterialCost {
    /// Price per square metre of treated surface
    pub unit_price: f64,
    /// Labor hours per square metre
    #[serde(default)]
    pub labor_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
    pub name: String,
    pub floor_area: f64,
    #[serde(default)]
    pub surfaces: SurfaceAreas,
}

/// Objective tuple (heating demand, thermal discomfort, price), all minimized
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Fitness {
    pub heating: f64,
    pub comfort: f64,
    pub price: f64,
}

impl Fitness {
    pub const ZERO: Fitness = Fitness { heating: 0.0, comfort: 0.0, price: 0.0 };

    /// Worst admissible value, given to individuals whose simulation failed.
    pub const SENTINEL: Fitness = Fitness {
        heating: f64::MAX,
        comfort: f64::MAX,
        price: f64::MAX,
    };

    pub fn new(heating: f64, comfort: f64, price: f64) -> Self {
        Self { heating, comfort, price }
    }

    pub fn objectives(&self) -> [f64; 3] {
        [self.heating, self.comfort, self.price]
    }

    pub fn is_sentinel(&self) -> bool {
        *self == Self::SENTINEL
    }
}

impl From<[f64; 3]> for Fitness {
    fn from(values: [f64; 3]) -> Self {
        Self::new(values[0], values[1], values[2])
    }
}

impl From<Fitness> for [f64; 3] {
    fn from(fitness: Fitness) -> Self {
        fitness.objectives()
    }
}

impl Add for Fitness {
    type Output = Fitness;

    fn add(self, rhs: Fitness) -> Fitness {
        Fitness::new(
            self.heating + rhs.heating,
            self.comfort + rhs.comfort,
            self.price + rhs.price,
        )
    }
}

impl AddAssign for Fitness {
    fn add_assign(&mut self, rhs: Fitness) {
        *self = *self + rhs;
    }
}

impl Mul<f64> for Fitness {
    type Output = Fitness;

    fn mul(self, factor: f64) -> Fitness {
        Fitness::new(self.heating * factor, self.comfort * factor, self.price * factor)
    }
}

/// Candidate retrofit plan. `fitness == None` means it must be (re)evaluated before selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual {
    pub genome: Genome,
    pub fitness: Option<Fitness>,
}

impl Individual {
    pub fn new(genome: Genome) -> Self {
        Self { genome, fitness: None }
    }

    pub fn with_fitness(genome: Genome, fitness: Fitness) -> Self {
        Self { genome, fitness: Some(fitness) }
    }

    pub fn is_valid(&self) -> bool {
        self.fitness.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fitness_serializes_as_tuple() {
        let fitness = Fitness::new(1.5, 2.0, 3.25);
        let json = serde_json::to_string(&fitness).unwrap();
        assert_eq!(json, "[1.5,2.0,3.25]");

        let back: Fitness = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fitness);
    }

    #[test]
    fn test_gene_kind_positions() {
        assert_eq!(GeneKind::at_position(0), GeneKind::Wall);
        assert_eq!(GeneKind::at_position(3), GeneKind::Window);
        assert_eq!(GeneKind::at_position(7), GeneKind::Window);
        assert_eq!(GeneKind::at_position(9), GeneKind::Ceiling);
    }
}
