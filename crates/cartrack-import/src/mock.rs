//! Mock roster generation.
//!
//! Produces a realistic fleet in the roster CSV format: sequential ids, make
//! and model drawn from per-make pools, a weighted color distribution, and
//! unique three-letter three-digit license plates.

use std::{collections::HashSet, io, path::Path};

use rand::Rng;
use thiserror::Error;

use cartrack_core::car::NewCar;

/// Makes with their model pools.
const MODELS_BY_MAKE: &[(&str, &[&str])] = &[
  ("Toyota", &[
    "Camry", "Corolla", "RAV4", "Highlander", "Prius", "Tacoma", "Tundra",
    "Sienna",
  ]),
  ("Honda", &[
    "Civic", "Accord", "CR-V", "Pilot", "Odyssey", "Ridgeline", "HR-V",
    "Passport",
  ]),
  ("Ford", &[
    "F-150", "Escape", "Explorer", "Mustang", "Focus", "Fusion", "Edge",
    "Expedition",
  ]),
  ("Chevrolet", &[
    "Silverado", "Equinox", "Malibu", "Traverse", "Tahoe", "Suburban",
    "Camaro", "Cruze",
  ]),
  ("Nissan", &[
    "Altima", "Sentra", "Rogue", "Pathfinder", "Titan", "Versa", "Murano",
    "Armada",
  ]),
  ("BMW", &[
    "3 Series", "5 Series", "X3", "X5", "X1", "X7", "7 Series", "4 Series",
  ]),
  ("Mercedes-Benz", &[
    "C-Class", "E-Class", "GLC", "GLE", "S-Class", "A-Class", "CLA", "GLS",
  ]),
  ("Audi", &["A4", "A6", "Q5", "Q7", "A3", "Q3", "A8", "Q8"]),
  ("Volkswagen", &[
    "Jetta", "Passat", "Tiguan", "Atlas", "Golf", "Arteon", "ID.4", "Taos",
  ]),
  ("Hyundai", &[
    "Elantra", "Sonata", "Tucson", "Santa Fe", "Accent", "Palisade",
    "Veloster", "Kona",
  ]),
  ("Kia", &[
    "Forte", "Optima", "Sorento", "Sportage", "Rio", "Telluride", "Soul",
    "Stinger",
  ]),
  ("Mazda", &[
    "Mazda3", "Mazda6", "CX-5", "CX-9", "MX-5 Miata", "CX-3", "CX-30",
    "CX-50",
  ]),
  ("Subaru", &[
    "Outback", "Forester", "Impreza", "Legacy", "Crosstrek", "Ascent", "WRX",
    "BRZ",
  ]),
  ("Lexus", &["ES", "RX", "NX", "GX", "IS", "LS", "LX", "UX"]),
  ("Infiniti", &[
    "Q50", "Q60", "QX60", "QX80", "QX50", "Q70", "QX30", "Q30",
  ]),
  ("Acura", &[
    "TLX", "MDX", "RDX", "ILX", "NSX", "TLX Type S", "MDX Type S", "Integra",
  ]),
  ("Cadillac", &[
    "Escalade", "XT5", "XT6", "CT5", "CT4", "XT4", "CT6", "ATS",
  ]),
  ("Buick", &[
    "Enclave", "Encore", "Envision", "LaCrosse", "Regal", "Verano",
    "Cascada", "Encore GX",
  ]),
  ("GMC", &[
    "Sierra", "Acadia", "Terrain", "Yukon", "Canyon", "Savana", "Suburban",
    "AT4",
  ]),
  ("Ram", &[
    "1500", "2500", "3500", "ProMaster", "ProMaster City", "Chassis Cab",
    "Classic", "TRX",
  ]),
];

/// Colors with integer weights in tenths of a percent, summing to 1000.
/// White/black/gray dominate, as on a real lot.
const COLOR_WEIGHTS: &[(&str, u32)] = &[
  ("White", 250),
  ("Black", 200),
  ("Gray", 150),
  ("Silver", 150),
  ("Blue", 80),
  ("Red", 70),
  ("Green", 30),
  ("Brown", 20),
  ("Gold", 20),
  ("Yellow", 10),
  ("Orange", 10),
  ("Purple", 5),
  ("Beige", 3),
  ("Maroon", 1),
  ("Navy", 1),
];

fn pick_color(rng: &mut impl Rng) -> &'static str {
  let total: u32 = COLOR_WEIGHTS.iter().map(|(_, w)| w).sum();
  let mut pick = rng.gen_range(0..total);
  for (color, weight) in COLOR_WEIGHTS {
    if pick < *weight {
      return color;
    }
    pick -= weight;
  }
  // Unreachable while the weights sum to `total`.
  "White"
}

fn random_plate(rng: &mut impl Rng) -> String {
  const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
  let mut plate = String::with_capacity(6);
  for _ in 0..3 {
    plate.push(LETTERS[rng.gen_range(0..LETTERS.len())] as char);
  }
  for _ in 0..3 {
    plate.push((b'0' + rng.gen_range(0..10u8)) as char);
  }
  plate
}

/// Generate `count` cars with ids `1..=count` and plates unique within the
/// roster. Deterministic for a seeded `rng`.
pub fn generate_cars(count: usize, rng: &mut impl Rng) -> Vec<NewCar> {
  let mut used_plates = HashSet::with_capacity(count);

  (1..=count as i64)
    .map(|id| {
      let (make, models) =
        MODELS_BY_MAKE[rng.gen_range(0..MODELS_BY_MAKE.len())];
      let model = models[rng.gen_range(0..models.len())];
      let color = pick_color(rng);

      let mut plate = random_plate(rng);
      while !used_plates.insert(plate.clone()) {
        plate = random_plate(rng);
      }

      NewCar {
        id,
        make:          make.to_owned(),
        model:         model.to_owned(),
        color:         color.to_owned(),
        license_plate: plate,
      }
    })
    .collect()
}

#[derive(Debug, Error)]
pub enum WriteError {
  #[error("cannot create roster file {path:?}: {source}")]
  Create {
    path:   String,
    source: io::Error,
  },

  #[error("cannot write roster: {0}")]
  Csv(#[from] csv::Error),

  #[error("cannot write roster: {0}")]
  Io(#[from] io::Error),
}

/// Write `cars` as a roster CSV with the `id,make,model,color,licensePlate`
/// header, overwriting `path`.
pub fn write_roster(
  path: impl AsRef<Path>,
  cars: &[NewCar],
) -> Result<(), WriteError> {
  let path = path.as_ref();
  let file = std::fs::File::create(path).map_err(|source| WriteError::Create {
    path: path.display().to_string(),
    source,
  })?;

  let mut writer = csv::Writer::from_writer(file);
  writer.write_record(["id", "make", "model", "color", "licensePlate"])?;
  for car in cars {
    writer.write_record([
      car.id.to_string().as_str(),
      car.make.as_str(),
      car.model.as_str(),
      car.color.as_str(),
      car.license_plate.as_str(),
    ])?;
  }
  writer.flush()?;
  Ok(())
}
