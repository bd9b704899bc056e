pub mod car;
pub mod driver;
pub mod handle_race;
pub mod incident;
pub mod lap;
pub mod laptime;
pub mod qualifying;
pub mod thermal;
pub mod tireset;
pub mod track;
