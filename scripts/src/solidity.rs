//! Definitions of the Solidity functions called while wiring the naming system
//! and registering names

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::too_many_arguments)]

use alloy_sol_types::sol;

sol! {
    #[sol(rpc)]
    interface ENSRegistry {
        function owner(bytes32 node) external view returns (address);
        function setSubnodeOwner(bytes32 node, bytes32 label, address owner) external returns (bytes32);
    }
}

sol! {
    #[sol(rpc)]
    interface BaseRegistrar {
        function controllers(address controller) external view returns (bool);
        function addController(address controller) external;
    }
}

sol! {
    #[sol(rpc)]
    interface NameWrapper {
        function controllers(address controller) external view returns (bool);
        function setController(address controller, bool active) external;
    }
}

sol! {
    #[sol(rpc)]
    interface ReverseRegistrar {
        function controllers(address controller) external view returns (bool);
        function defaultResolver() external view returns (address);
        function setController(address controller, bool enabled) external;
        function setDefaultResolver(address resolver) external;
    }
}

sol! {
    #[sol(rpc)]
    interface RegistrarController {
        struct Price {
            uint256 base;
            uint256 premium;
        }

        function minCommitmentAge() external view returns (uint256);
        function maxCommitmentAge() external view returns (uint256);
        function valid(string memory name) external pure returns (bool);
        function available(string memory name) external view returns (bool);
        function rentPrice(string memory name, uint256 duration) external view returns (Price memory price);
        function makeCommitment(
            string memory name,
            address owner,
            uint256 duration,
            bytes32 secret,
            address resolver,
            bytes[] calldata data,
            bool reverseRecord,
            uint32 fuses,
            uint64 wrapperExpiry
        ) external pure returns (bytes32);
        function commit(bytes32 commitment) external;
        function register(
            string calldata name,
            address owner,
            uint256 duration,
            bytes32 secret,
            address resolver,
            bytes[] calldata data,
            bool reverseRecord,
            uint32 fuses,
            uint64 wrapperExpiry
        ) external payable;
    }
}
