//! Repository implementations

mod meal;

pub use meal::MealRepo;
