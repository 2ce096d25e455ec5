
mod dashboard;
mod file;
mod profile;
mod project;
