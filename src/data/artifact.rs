use std::path::Path;

use alloy::dyn_abi::{DynSolValue, FunctionExt, JsonAbiExt};
use alloy::json_abi::{Function, JsonAbi, StateMutability};
use alloy::primitives::{Address, B256};
use serde::Deserialize;
use thiserror::Error;

use crate::data::provider::{ChainProvider, ProviderError};

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact is neither a compiler artifact nor an ABI array: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum ContractError {
    #[error("function {0} not found in ABI")]
    UnknownFunction(String),

    #[error("failed to encode call to {function}: {reason}")]
    Encode { function: String, reason: String },

    #[error("failed to decode result of {function}: {reason}")]
    Decode { function: String, reason: String },

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Compiled contract interface: the ABI plus the metadata we display.
#[derive(Debug, Clone)]
pub struct ContractArtifact {
    pub name: Option<String>,
    pub abi: JsonAbi,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArtifactJson {
    Compiled {
        #[serde(default, rename = "contractName")]
        contract_name: Option<String>,
        abi: JsonAbi,
    },
    Bare(JsonAbi),
}

impl ContractArtifact {
    pub fn from_json(json: &str) -> Result<Self, ArtifactError> {
        let artifact = match serde_json::from_str::<ArtifactJson>(json)? {
            ArtifactJson::Compiled { contract_name, abi } => Self {
                name: contract_name,
                abi,
            },
            ArtifactJson::Bare(abi) => Self { name: None, abi },
        };
        Ok(artifact)
    }

    pub fn from_path(path: &Path) -> Result<Self, ArtifactError> {
        let json = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }
}

/// A contract interface bound to an address. Construction is local and
/// infallible; every call goes through the provider it is given.
#[derive(Debug, Clone)]
pub struct ContractHandle {
    address: Address,
    abi: JsonAbi,
}

impl ContractHandle {
    pub fn new(abi: JsonAbi, address: Address) -> Self {
        Self { address, abi }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn abi(&self) -> &JsonAbi {
        &self.abi
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.abi.function(name).and_then(|overloads| overloads.first())
    }

    pub fn view_functions(&self) -> impl Iterator<Item = &Function> {
        self.abi.functions().filter(|f| {
            matches!(
                f.state_mutability,
                StateMutability::View | StateMutability::Pure
            )
        })
    }

    /// Pick the function plotted as the bonding curve: `preferred` when given,
    /// otherwise the first view function mapping one uint to one uint.
    pub fn curve_function(&self, preferred: Option<&str>) -> Option<&Function> {
        match preferred {
            Some(name) => self
                .abi
                .function(name)?
                .iter()
                .find(|f| is_uint_to_uint(f)),
            None => self.view_functions().find(|f| is_uint_to_uint(f)),
        }
    }

    /// Name of the ABI event whose signature hash is `topic0`.
    pub fn event_name(&self, topic0: &B256) -> Option<&str> {
        self.abi
            .events()
            .find(|event| event.selector() == *topic0)
            .map(|event| event.name.as_str())
    }

    pub async fn call_function(
        &self,
        provider: &dyn ChainProvider,
        function: &Function,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, ContractError> {
        let calldata = function
            .abi_encode_input(args)
            .map_err(|e| ContractError::Encode {
                function: function.name.clone(),
                reason: e.to_string(),
            })?;

        let raw = provider.call(self.address, calldata.into()).await?;

        function
            .abi_decode_output(&raw, true)
            .map_err(|e| ContractError::Decode {
                function: function.name.clone(),
                reason: e.to_string(),
            })
    }

    pub async fn call_by_name(
        &self,
        provider: &dyn ChainProvider,
        name: &str,
        args: &[DynSolValue],
    ) -> Result<Vec<DynSolValue>, ContractError> {
        let function = self
            .function(name)
            .ok_or_else(|| ContractError::UnknownFunction(name.to_string()))?;
        self.call_function(provider, function, args).await
    }
}

fn is_uint_to_uint(function: &Function) -> bool {
    function.inputs.len() == 1
        && function.outputs.len() == 1
        && function.inputs[0].ty.starts_with("uint")
        && function.outputs[0].ty.starts_with("uint")
}

#[cfg(test)]
mod tests {
    use alloy::primitives::U256;

    use super::*;
    use crate::data::testing::{MockProvider, sample_abi_json, sample_address};

    fn handle() -> ContractHandle {
        let artifact = ContractArtifact::from_json(&sample_abi_json()).unwrap();
        ContractHandle::new(artifact.abi, sample_address())
    }

    #[test]
    fn test_parse_compiled_artifact() {
        let json = format!(
            r#"{{"contractName":"BondingCurve","abi":{},"bytecode":"0x00"}}"#,
            sample_abi_json()
        );
        let artifact = ContractArtifact::from_json(&json).unwrap();
        assert_eq!(artifact.name.as_deref(), Some("BondingCurve"));
        assert!(artifact.abi.function("priceToMint").is_some());
    }

    #[test]
    fn test_parse_bare_abi() {
        let artifact = ContractArtifact::from_json(&sample_abi_json()).unwrap();
        assert!(artifact.name.is_none());
        assert_eq!(artifact.abi.events().count(), 1);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(
            ContractArtifact::from_json(r#"{"nope":1}"#),
            Err(ArtifactError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ContractArtifact::from_path(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::Io { .. }));
    }

    #[test]
    fn test_curve_function_autodetect() {
        let handle = handle();
        let function = handle.curve_function(None).unwrap();
        assert_eq!(function.name, "priceToMint");
    }

    #[test]
    fn test_curve_function_preferred_must_be_uint_to_uint() {
        let handle = handle();
        assert!(handle.curve_function(Some("totalSupply")).is_none());
        assert!(handle.curve_function(Some("missing")).is_none());
        assert_eq!(
            handle.curve_function(Some("rewardForBurn")).unwrap().name,
            "rewardForBurn"
        );
    }

    #[test]
    fn test_event_name() {
        let handle = handle();
        let minted = handle.abi().events().next().unwrap().selector();
        assert_eq!(handle.event_name(&minted), Some("Minted"));
        assert_eq!(handle.event_name(&B256::ZERO), None);
    }

    #[tokio::test]
    async fn test_call_function_roundtrip() {
        let provider = MockProvider::deployed().with_call(|_, calldata| {
            // price = 2 * supply
            let supply = U256::from_be_slice(&calldata[4..36]);
            Ok(DynSolValue::Uint(supply * U256::from(2), 256).abi_encode().into())
        });
        let handle = handle();
        let result = handle
            .call_by_name(&provider, "priceToMint", &[DynSolValue::Uint(U256::from(21), 256)])
            .await
            .unwrap();
        assert_eq!(result, vec![DynSolValue::Uint(U256::from(42), 256)]);
    }

    #[tokio::test]
    async fn test_call_unknown_function() {
        let provider = MockProvider::deployed();
        let err = handle()
            .call_by_name(&provider, "nope", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::UnknownFunction(_)));
    }

    #[tokio::test]
    async fn test_call_with_wrong_arguments() {
        let provider = MockProvider::deployed();
        let err = handle()
            .call_by_name(&provider, "priceToMint", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ContractError::Encode { .. }));
    }
}
