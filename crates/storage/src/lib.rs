#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

pub mod json_file;
#[allow(clippy::module_name_repetitions)]
pub mod local_storage;
pub mod memory;
pub mod seed;

#[cfg(test)]
mod tests {
    pub mod data;
}
