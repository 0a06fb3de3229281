use smirk::Element;

/// Depth of the note commitment tree, which holds `2^32` commitments
pub const MERKLE_TREE_DEPTH: usize = 32;

/// Number of inputs to the note commitment hash
///
/// The order is `(amount, token, salt, owner_public_key)` and is part of the protocol: changing it
/// changes every commitment
pub const COMMITMENT_ARITY: usize = 4;

/// Domain separator for [`PoseidonKeyDerivation`](crate::PoseidonKeyDerivation)
pub const KEY_DOMAIN: Element = Element::new(0x6b65_7973);

/// Personalisation for the blake2b transcript of the development backend
pub const BLAKE_PERSONALISATION: &[u8; 13] = b"Shielded_Pool";
