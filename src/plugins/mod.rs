pub mod gobuster;
pub mod nmap;
pub mod types;
