//! Contract event bindings

use ethers::prelude::abigen;

abigen!(
    StakingContract,
    r#"[
        event Staked(address indexed account, uint256 amount)
    ]"#
);

abigen!(
    TokenContract,
    r#"[
        event Transfer(address indexed from, address indexed to, uint256 value)
    ]"#
);
