pub mod kinematics;
pub mod locomotion;
pub mod terminal;
pub mod platforms;
pub mod stars;
pub mod hazards;
pub mod autopilot;
