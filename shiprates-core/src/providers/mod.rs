pub mod shiphawk;
pub mod usps;
