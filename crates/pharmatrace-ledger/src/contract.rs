//! Medicine registry contract bindings

use alloy::sol;

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    #[derive(Debug)]
    interface IMedicineRegistry {
        function getMedicineIPFSHistory(uint256 _id) external view returns (string[] memory);
        function getMedicineOwner(uint256 _id) external view returns (address);
        function getPreviousOwners(uint256 _id) external view returns (address[] memory);
    }
}
