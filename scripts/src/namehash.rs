//! EIP-137 name hashing, used to derive the registry nodes the scripts operate on

use alloy::primitives::{keccak256, B256};

/// The root node of the registry, owned by the deployer of the `ENSRegistry`
pub const ROOT_NODE: B256 = B256::ZERO;

/// The label separator in a dotted name
const LABEL_SEPARATOR: char = '.';

/// Hash a single label, i.e. one component of a dotted name
pub fn labelhash(label: &str) -> B256 {
    keccak256(label.as_bytes())
}

/// Compute the node of a dotted name.
///
/// Labels are folded in from the right:
/// `node = keccak256(node || labelhash(label))`, starting at the root node.
/// The empty name is the root node itself.
pub fn namehash(name: &str) -> B256 {
    if name.is_empty() {
        return ROOT_NODE;
    }

    name.rsplit(LABEL_SEPARATOR).fold(ROOT_NODE, subnode)
}

/// Hash a child label under an existing node
pub fn subnode(parent: B256, label: &str) -> B256 {
    keccak256([parent.as_slice(), labelhash(label).as_slice()].concat())
}

#[cfg(test)]
mod tests {
    use alloy::primitives::b256;

    use super::{labelhash, namehash, subnode, ROOT_NODE};

    #[test]
    fn test_empty_name_is_root() {
        assert_eq!(namehash(""), ROOT_NODE);
    }

    #[test]
    fn test_namehash_vectors() {
        // Vectors taken from https://eips.ethereum.org/EIPS/eip-137
        assert_eq!(
            namehash("eth"),
            b256!("93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae")
        );
        assert_eq!(
            namehash("foo.eth"),
            b256!("de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f")
        );
        assert_eq!(
            namehash("addr.reverse"),
            b256!("91d1777781884d03a6757a803996e38de2a42967fb37eeaca72729271025a9e2")
        );
    }

    #[test]
    fn test_labelhash() {
        assert_eq!(
            labelhash("eth"),
            b256!("4f5b812789fc606be1b3b16908db13fc7a9adf7ca72641f84d75b47069d3d7f0")
        );
        assert_eq!(
            labelhash("addr"),
            b256!("e5e14487b78f85faa6e1808e89246cf57dd34831548ff2e6097380d98db2504a")
        );
    }

    #[test]
    fn test_subnode_matches_namehash() {
        let web3 = namehash("web3");
        assert_eq!(
            web3,
            b256!("587d09fe5fa45354680537d38145a28b772971e0f293af3ee0c536fc919710fb")
        );
        assert_eq!(subnode(web3, "jiuhua"), namehash("jiuhua.web3"));
        assert_eq!(subnode(ROOT_NODE, "reverse"), namehash("reverse"));
    }
}
