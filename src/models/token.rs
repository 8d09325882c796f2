use alloy::primitives::{address, Address};
use serde::Serialize;

/// Pseudo-address used for native ether
pub const ETH_ADDRESS: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Compound market symbols are the underlying symbol with this prefix
pub const MARKET_PREFIX: &str = "c";

const UNDERLYING_TOKENS: &[(&str, &str, u8, Address)] = &[
    ("BAT", "Basic Attention Token", 18, address!("0D8775F648430679A709E98d2b0Cb6250d2887EF")),
    ("SAI", "Single Collateral DAI", 18, address!("89d24A6b4CcB1B6fAA2625fE562bDD9a23260359")),
    ("DAI", "Dai Stablecoin", 18, address!("6B175474E89094C44Da98b954EedeAC495271d0F")),
    ("ETH", "Ether", 18, ETH_ADDRESS),
    ("USDC", "USD Coin", 6, address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48")),
    ("REP", "Augur", 18, address!("1985365e9f78359a9B6AD760e32412f4a445E862")),
    ("WBTC", "Wrapped BTC", 8, address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599")),
    ("ZRX", "0x Protocol Token", 18, address!("E41d2489571d322189246DaFA5ebDe1F4699F498")),
];

const COMPOUND_MARKETS: &[(&str, &str, u8, Address)] = &[
    ("cBAT", "Compound Basic Attention Token (cBAT)", 8, address!("6c8c6b02e7b2be14d4fa6022dfd6d75921d90e4e")),
    ("cSAI", "Compound SAI (cSAI)", 8, address!("f5dce57282a584d2746faf1593d3121fcac444dc")),
    ("cDAI", "Compound DAI (cDAI)", 8, address!("5d3a536E4D6DbD6114cc1Ead35777bAB948E3643")),
    ("cETH", "Compound ETH (cETH)", 8, address!("4ddc2d193948926d02f9b1fe9e1daa0718270ed5")),
    ("cUSDC", "Compound USD Coin (cUSDC)", 8, address!("39AA39c021dfbaE8faC545936693aC917d5E7563")),
    ("cREP", "Compound Augur (cREP)", 8, address!("158079Ee67Fce2f58472A96584A73C7Ab9AC95c1")),
    ("cWBTC", "Compound Wrapped BTC (cWBTC)", 8, address!("c11b1268c1a384e55c48c2391d8d480264a3a7f4")),
    ("cZRX", "Compound 0x (cZRX)", 8, address!("B3319f5D18Bc0D84dD1b4825Dcde5d5f7266d407")),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub symbol: String,
    pub name: String,
    pub decimals: u8,
    pub address: Address,
}

impl Token {
    pub fn new(symbol: &str, name: &str, decimals: u8, address: Address) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            decimals,
            address,
        }
    }

    pub fn is_native(&self) -> bool {
        self.address == ETH_ADDRESS
    }
}

/// Static table of the assets the migrator understands and the Compound
/// markets wrapping them.
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<Token>,
    markets: Vec<Token>,
}

impl TokenRegistry {
    pub fn new(tokens: Vec<Token>, markets: Vec<Token>) -> Self {
        Self { tokens, markets }
    }

    /// Ethereum mainnet assets and Compound v2 markets
    pub fn mainnet() -> Self {
        let build = |table: &[(&str, &str, u8, Address)]| {
            table
                .iter()
                .map(|(symbol, name, decimals, address)| Token::new(symbol, name, *decimals, *address))
                .collect::<Vec<_>>()
        };

        Self::new(build(UNDERLYING_TOKENS), build(COMPOUND_MARKETS))
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn markets(&self) -> &[Token] {
        &self.markets
    }

    pub fn by_symbol(&self, symbol: &str) -> Option<&Token> {
        self.tokens
            .iter()
            .chain(self.markets.iter())
            .find(|t| t.symbol == symbol)
    }

    pub fn by_address(&self, address: Address) -> Option<&Token> {
        self.tokens
            .iter()
            .chain(self.markets.iter())
            .find(|t| t.address == address)
    }

    /// Compound market wrapping the token at `underlying`
    pub fn market_for(&self, underlying: Address) -> Option<&Token> {
        let token = self.tokens.iter().find(|t| t.address == underlying)?;
        let market_symbol = format!("{}{}", MARKET_PREFIX, token.symbol);
        self.markets.iter().find(|m| m.symbol == market_symbol)
    }

    /// Underlying asset of a Compound market
    pub fn underlying_for(&self, market: &Token) -> Option<&Token> {
        let symbol = market.symbol.strip_prefix(MARKET_PREFIX)?;
        self.tokens.iter().find(|t| t.symbol == symbol)
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::mainnet()
    }
}
