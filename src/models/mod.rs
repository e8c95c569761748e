pub mod appointment;
pub mod doctor;
pub mod enums;
pub mod patient;
pub mod prescription;

pub use appointment::Appointment;
pub use doctor::Doctor;
pub use enums::Weekday;
pub use patient::Patient;
pub use prescription::Prescription;
