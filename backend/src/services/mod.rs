//! Business logic services for the Contract Farming Marketplace

pub mod contract_farming;

pub use contract_farming::ContractFarmingService;
