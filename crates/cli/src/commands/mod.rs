pub mod check;
pub mod init;
pub mod params;
pub mod run;
pub mod topology;
