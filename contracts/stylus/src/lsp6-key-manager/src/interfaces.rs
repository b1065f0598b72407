//! Solidity ABI of the contracts the key manager talks to, and of its own events.

use stylus_sdk::alloy_sol_types::sol;

sol! {
    /// ERC725 account (ERC725X + ERC725Y) with LSP14 ownership.
    interface IERC725 {
        function owner() external view returns (address ownerAddress);
        function pendingOwner() external view returns (address pendingOwnerAddress);

        function getData(bytes32 dataKey) external view returns (bytes dataValue);
        function getDataBatch(bytes32[] dataKeys) external view returns (bytes[] dataValues);
        function setData(bytes32 dataKey, bytes dataValue) external payable;
        function setDataBatch(bytes32[] dataKeys, bytes[] dataValues) external payable;

        function execute(uint256 operationType, address target, uint256 value, bytes data)
            external
            payable
            returns (bytes result);
        function executeBatch(uint256[] operationsType, address[] targets, uint256[] values, bytes[] datas)
            external
            payable
            returns (bytes[] results);

        function transferOwnership(address newOwner) external;
        function acceptOwnership() external;
        function renounceOwnership() external;
    }

    interface IERC165 {
        function supportsInterface(bytes4 interfaceId) external view returns (bool supported);
    }

    /// Emitted once per payload that passed permission verification.
    #[derive(Debug, PartialEq, Eq)]
    event PermissionsVerified(address indexed signer, uint256 indexed value, bytes4 indexed selector);
}
