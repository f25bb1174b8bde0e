/// Sheet settings and their JSON form.
pub mod config;
