mod common;

#[cfg(test)]
mod test_construction {
    use std::collections::HashSet;

    use rstest::rstest;
    use solana_instruction::Instruction;
    use solana_pubkey::Pubkey;
    use solana_sdk::{signer::Signer, system_program};
    use spl_associated_token_account::get_associated_token_address;

    use orca_swap_router::{
        error::SwapError,
        pools_pair::PoolsPair,
        swap_info::token::TOKEN_SWAP_V2_PROGRAM_ID,
        transaction::{
            PreparedSwap, SwapRequest,
            accounts::{TOKEN_ACCOUNT_SPAN, prepare_associated_token_account, prepare_wrapped_sol_account},
            prepare_for_swapping,
        },
    };

    use crate::common::{ETH_SOL, ETH_USDC, Fixture, MIN_RENT_EXEMPTION, SOL_BTC, SOL_USDC, USDC_USDT, init_test_logger};

    const SLIPPAGE: f64 = 0.01;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        CreateAccount,
        InitializeAccount,
        CloseAccount,
        CreateAssociatedAccount,
        Swap,
        Other,
    }
    use Kind::*;

    fn kind(instruction: &Instruction) -> Kind {
        if instruction.program_id == system_program::ID {
            CreateAccount
        } else if instruction.program_id == spl_associated_token_account::ID {
            CreateAssociatedAccount
        } else if instruction.program_id == spl_token::ID {
            match instruction.data[0] {
                1 => InitializeAccount,
                9 => CloseAccount,
                _ => Other,
            }
        } else if instruction.program_id == TOKEN_SWAP_V2_PROGRAM_ID && instruction.data[0] == 1 {
            Swap
        } else {
            Other
        }
    }

    fn kinds(instructions: &[Instruction]) -> Vec<Kind> {
        instructions.iter().map(kind).collect()
    }

    /// `(amount_in, minimum_amount_out)` of a swap instruction.
    fn swap_amounts(instruction: &Instruction) -> (u64, u64) {
        let amount = |range: std::ops::Range<usize>| u64::from_le_bytes(instruction.data[range].try_into().unwrap());
        (amount(1..9), amount(9..17))
    }

    /// `(user_source, user_destination)` of a swap instruction.
    fn swap_wallets(instruction: &Instruction) -> (Pubkey, Pubkey) {
        (instruction.accounts[3].pubkey, instruction.accounts[6].pubkey)
    }

    fn swaps(prepared: &PreparedSwap) -> Vec<&Instruction> {
        prepared
            .transactions
            .iter()
            .flat_map(|transaction| &transaction.instructions)
            .filter(|instruction| kind(instruction) == Swap)
            .collect()
    }

    async fn prepare(
        fixture: &Fixture,
        pair: &PoolsPair,
        from_wallet_pubkey: Pubkey,
        to_wallet_pubkey: Option<Pubkey>,
        amount: u64,
    ) -> Result<PreparedSwap, SwapError> {
        let info = fixture.info();
        let request = SwapRequest {
            from_wallet_pubkey,
            to_wallet_pubkey,
            pools_pair: pair,
            amount,
            fee_payer: None,
            slippage: SLIPPAGE,
        };
        prepare_for_swapping(&info, fixture.rpc.as_ref(), &fixture.owner, &request, TOKEN_ACCOUNT_SPAN).await
    }

    #[tokio::test]
    async fn direct_swap_from_native_sol_fits_one_transaction() {
        init_test_logger();
        let fixture = Fixture::new();
        let owner = fixture.owner.pubkey();
        let pair = PoolsPair::Direct(fixture.resolved_pool(SOL_BTC));

        let prepared = prepare(&fixture, &pair, owner, None, 10_000).await.unwrap();

        let [transaction] = prepared.transactions.as_slice() else {
            panic!("expected a single transaction, got {}", prepared.transactions.len());
        };
        assert_eq!(
            kinds(&transaction.instructions),
            [CreateAccount, InitializeAccount, CreateAssociatedAccount, Swap, CloseAccount]
        );
        assert_eq!(transaction.account_creation_fee, 2 * MIN_RENT_EXEMPTION);
        assert_eq!(transaction.signers.len(), 2);
        assert_eq!(transaction.signers[0].pubkey(), owner);

        let destination = get_associated_token_address(&owner, &fixture.mint("BTC"));
        assert_eq!(prepared.new_wallet_pubkey, Some(destination));

        let swap = swaps(&prepared)[0];
        assert_eq!(swap_amounts(swap), (10_000, 23));
        assert_eq!(swap_wallets(swap), (transaction.signers[1].pubkey(), destination));
        // temporary account funded with the amount on top of rent
        let funded = u64::from_le_bytes(transaction.instructions[0].data[4..12].try_into().unwrap());
        assert_eq!(funded, 10_000 + MIN_RENT_EXEMPTION);
    }

    #[tokio::test]
    async fn direct_swap_between_existing_wallets_is_a_bare_swap() {
        init_test_logger();
        let fixture = Fixture::new();
        let pair = PoolsPair::Direct(fixture.resolved_pool(ETH_USDC));
        let (from, to) = (Pubkey::new_unique(), Pubkey::new_unique());

        let prepared = prepare(&fixture, &pair, from, Some(to), 100_000_000).await.unwrap();

        assert_eq!(prepared.transactions.len(), 1);
        assert_eq!(kinds(&prepared.transactions[0].instructions), [Swap]);
        assert_eq!(prepared.transactions[0].account_creation_fee, 0);
        assert_eq!(prepared.new_wallet_pubkey, None);
        assert_eq!(swap_wallets(swaps(&prepared)[0]), (from, to));
    }

    #[rstest]
    #[case(false, 2)]
    #[case(true, 1)]
    #[tokio::test]
    async fn transitive_swap_splits_account_creation_off(#[case] accounts_exist: bool, #[case] expected_transactions: usize) {
        init_test_logger();
        let fixture = Fixture::new();
        let owner = fixture.owner.pubkey();
        let (usdc, usdt) = (fixture.mint("USDC"), fixture.mint("USDT"));
        if accounts_exist {
            fixture.rpc.add_associated_account(owner, usdc);
            fixture.rpc.add_associated_account(owner, usdt);
        }
        let first = fixture.resolved_pool(ETH_USDC);
        let pair = PoolsPair::Transitive(first.clone(), fixture.resolved_pool(USDC_USDT));
        let from = Pubkey::new_unique();

        let prepared = prepare(&fixture, &pair, from, None, 100_000_000).await.unwrap();
        assert_eq!(prepared.transactions.len(), expected_transactions);

        let swap_transaction = prepared.transactions.last().unwrap();
        assert_eq!(kinds(&swap_transaction.instructions), [Swap, Swap]);
        assert_eq!(swap_transaction.account_creation_fee, 0);
        assert_eq!(swap_transaction.signers.len(), 1);

        if !accounts_exist {
            let setup = &prepared.transactions[0];
            assert_eq!(kinds(&setup.instructions), [CreateAssociatedAccount, CreateAssociatedAccount]);
            assert_eq!(setup.account_creation_fee, 2 * MIN_RENT_EXEMPTION);
            assert_eq!(setup.signers[0].pubkey(), owner);
        }

        let intermediary = get_associated_token_address(&owner, &usdc);
        let destination = get_associated_token_address(&owner, &usdt);
        assert_eq!(prepared.new_wallet_pubkey, Some(destination));

        let legs = swaps(&prepared);
        assert_eq!(swap_wallets(legs[0]), (from, intermediary));
        assert_eq!(swap_wallets(legs[1]), (intermediary, destination));
        // the second leg swaps what the first leg is guaranteed to yield
        let first_minimum = first.minimum_amount_out(100_000_000, SLIPPAGE).unwrap();
        assert_eq!(swap_amounts(legs[0]), (100_000_000, first_minimum));
        assert_eq!(swap_amounts(legs[1]).0, first_minimum);
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    #[tokio::test]
    async fn native_intermediary_is_created_inside_the_swap_transaction(#[case] destination_exists: bool) {
        init_test_logger();
        let fixture = Fixture::new();
        let owner = fixture.owner.pubkey();
        if destination_exists {
            fixture.rpc.add_associated_account(owner, fixture.mint("ETH"));
        }
        let pair = PoolsPair::Transitive(
            fixture.resolved_pool(SOL_USDC).reversed(),
            fixture.resolved_pool(ETH_SOL).reversed(),
        );

        let prepared = prepare(&fixture, &pair, Pubkey::new_unique(), None, 1_000_000_000)
            .await
            .unwrap();

        let swap_transaction = prepared.transactions.last().unwrap();
        assert_eq!(
            kinds(&swap_transaction.instructions),
            [CreateAccount, InitializeAccount, Swap, Swap, CloseAccount]
        );
        assert_eq!(swap_transaction.account_creation_fee, MIN_RENT_EXEMPTION);
        assert_eq!(swap_transaction.signers.len(), 2);
        assert_eq!(swap_transaction.signers[0].pubkey(), owner);

        if destination_exists {
            assert_eq!(prepared.transactions.len(), 1);
        } else {
            assert_eq!(prepared.transactions.len(), 2);
            assert_eq!(kinds(&prepared.transactions[0].instructions), [CreateAssociatedAccount]);
        }
        for setup in &prepared.transactions[..prepared.transactions.len() - 1] {
            assert!(!kinds(&setup.instructions).contains(&CreateAccount));
        }

        // the wrapped intermediary is the one the first leg pays into
        let wrapped = swap_transaction.signers[1].pubkey();
        let legs = swaps(&prepared);
        assert_eq!(swap_wallets(legs[0]).1, wrapped);
        assert_eq!(swap_wallets(legs[1]).0, wrapped);
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    #[tokio::test]
    async fn new_accounts_are_closed_only_when_asked(#[case] close_afterward: bool) {
        init_test_logger();
        let fixture = Fixture::new();
        let owner = fixture.owner.pubkey();
        let expected_cleanup: &[Kind] = if close_afterward { &[CloseAccount] } else { &[] };

        let wrapped = prepare_wrapped_sol_account(&owner, 1_000, &owner, MIN_RENT_EXEMPTION, close_afterward).unwrap();
        assert_eq!(kinds(&wrapped.instructions), [CreateAccount, InitializeAccount]);
        assert_eq!(kinds(&wrapped.cleanup_instructions), expected_cleanup);
        assert_eq!(wrapped.signers.len(), 1);

        let usdc = fixture.mint("USDC");
        let associated = prepare_associated_token_account(fixture.rpc.as_ref(), &owner, &usdc, &owner, close_afterward)
            .await
            .unwrap();
        assert_eq!(associated.account, get_associated_token_address(&owner, &usdc));
        assert_eq!(kinds(&associated.instructions), [CreateAssociatedAccount]);
        assert_eq!(kinds(&associated.cleanup_instructions), expected_cleanup);
        for close in wrapped.cleanup_instructions.iter().chain(&associated.cleanup_instructions) {
            assert!(close.accounts[0].pubkey == wrapped.account || close.accounts[0].pubkey == associated.account);
        }
    }

    #[tokio::test]
    async fn split_transactions_neither_drop_nor_duplicate_instructions() {
        init_test_logger();
        let fixture = Fixture::new();
        let pair = PoolsPair::Transitive(
            fixture.resolved_pool(SOL_USDC).reversed(),
            fixture.resolved_pool(ETH_SOL).reversed(),
        );

        let prepared = prepare(&fixture, &pair, Pubkey::new_unique(), None, 1_000_000_000)
            .await
            .unwrap();

        let all = prepared
            .transactions
            .iter()
            .flat_map(|transaction| &transaction.instructions)
            .collect::<Vec<_>>();
        let mut all_kinds = all.iter().map(|instruction| kind(instruction)).collect::<Vec<_>>();
        all_kinds.sort_by_key(|kind| *kind as u8);
        assert_eq!(
            all_kinds,
            [CreateAccount, InitializeAccount, CloseAccount, CreateAssociatedAccount, Swap, Swap]
        );

        let distinct = all
            .iter()
            .map(|instruction| (instruction.program_id, instruction.data.clone(), instruction.accounts.clone()))
            .map(|(program_id, data, accounts)| {
                (program_id, data, accounts.into_iter().map(|meta| meta.pubkey).collect::<Vec<_>>())
            })
            .collect::<HashSet<_>>();
        assert_eq!(distinct.len(), all.len());
    }

    #[tokio::test]
    async fn fee_payer_funds_created_accounts() {
        let fixture = Fixture::new();
        let owner = fixture.owner.pubkey();
        let payer = Pubkey::new_unique();
        let pair = PoolsPair::Direct(fixture.resolved_pool(SOL_BTC));
        let info = fixture.info();
        let request = SwapRequest {
            from_wallet_pubkey: owner,
            to_wallet_pubkey: None,
            pools_pair: &pair,
            amount: 10_000,
            fee_payer: Some(payer),
            slippage: SLIPPAGE,
        };

        let prepared = prepare_for_swapping(&info, fixture.rpc.as_ref(), &fixture.owner, &request, TOKEN_ACCOUNT_SPAN)
            .await
            .unwrap();

        let instructions = &prepared.transactions[0].instructions;
        assert_eq!(kind(&instructions[0]), CreateAccount);
        assert_eq!(instructions[0].accounts[0].pubkey, payer);
        assert_eq!(kind(&instructions[2]), CreateAssociatedAccount);
        assert_eq!(instructions[2].accounts[0].pubkey, payer);
    }

    #[tokio::test]
    async fn unresolved_pools_are_rejected() {
        let fixture = Fixture::new();
        let pair = PoolsPair::Direct(fixture.pools[SOL_BTC].clone());

        let result = prepare(&fixture, &pair, Pubkey::new_unique(), None, 10_000).await;
        assert!(matches!(result, Err(SwapError::InvalidPool(_))));
    }
}
