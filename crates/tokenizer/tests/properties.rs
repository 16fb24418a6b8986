//! End-to-end properties of training, vocabulary derivation and tokenization.

use bpegram_tokenizer::{
    BpeTrainer, CancellationToken, GrammarError, ModelFormat, ModelLoader, ModelSaver, Symbol,
    Tokenizer, TrainingConfig, TrainingOutput, Vocabulary,
};

const SHAKESPEARE: &[u8] = b"To be, or not to be, that is the question:\n\
Whether 'tis nobler in the mind to suffer\n\
The slings and arrows of outrageous fortune,\n\
Or to take arms against a sea of troubles\n\
And by opposing end them. To die, to sleep;\n\
No more; and by a sleep to say we end\n";

fn train(input: &[u8]) -> TrainingOutput {
    let config = TrainingConfig::builder()
        .verify_invariants(true)
        .build()
        .unwrap();
    BpeTrainer::from_bytes(config, input)
        .unwrap()
        .train(&CancellationToken::new())
        .unwrap()
}

fn corpora() -> Vec<Vec<u8>> {
    let mut corpora = vec![
        Vec::new(),
        b"a".to_vec(),
        b"aaaa".to_vec(),
        b"abab".to_vec(),
        b"mississippi".to_vec(),
        b"abracadabra abracadabra".to_vec(),
        SHAKESPEARE.to_vec(),
        (0u8..=255).collect(),
    ];

    let mut state: u32 = 7;
    for len in [13usize, 64, 257] {
        corpora.push(
            (0..len)
                .map(|_| {
                    state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                    (state >> 24) as u8 % 4
                })
                .collect(),
        );
    }
    corpora
}

#[test]
fn round_trip_reconstructs_input() {
    for input in corpora() {
        let output = train(&input);
        let vocab = Vocabulary::build(&output.grammar).unwrap();

        assert_eq!(
            vocab.expand_to_bytes(&output.sequence).unwrap(),
            input,
            "input {:?}",
            input
        );
    }
}

#[test]
fn round_trip_edge_lengths() {
    for input in [&b""[..], &b"q"[..], &b"qq"[..]] {
        let output = train(input);
        let vocab = Vocabulary::build(&output.grammar).unwrap();
        assert_eq!(vocab.expand_to_bytes(&output.sequence).unwrap(), input);
    }
}

#[test]
fn final_byte_is_part_of_training() {
    let output = train(b"abcabc");
    let vocab = Vocabulary::build(&output.grammar).unwrap();

    assert_eq!(output.sequence.len(), 2);
    assert_eq!(vocab.expand_to_bytes(&output.sequence).unwrap(), b"abcabc");
    assert_eq!(vocab.get(*output.sequence.last().unwrap()), Some(&[97, 98, 99][..]));
}

#[test]
fn retokenizing_preserves_bytes() {
    for input in corpora() {
        let output = train(&input);
        let tokenizer = match Tokenizer::from_grammar(&output.grammar) {
            Ok(tokenizer) => tokenizer,
            // Collisions are reported rather than resolved; nothing to check.
            Err(GrammarError::GrammarAmbiguous { .. }) => continue,
            Err(err) => panic!("unexpected error: {}", err),
        };

        let terminals = tokenizer.vocab().expand_sequence(&output.sequence).unwrap();
        let retokenized = tokenizer.tokenize(&terminals).unwrap();

        assert_eq!(
            tokenizer.vocab().expand_sequence(&retokenized).unwrap(),
            terminals
        );
        assert!(retokenized.len() <= terminals.len());
    }
}

#[test]
fn retokenizing_known_grammar() {
    let output = train(b"abababab");
    let tokenizer = Tokenizer::from_grammar(&output.grammar).unwrap();

    let encoding = tokenizer.encode(b"abababab").unwrap();
    assert_eq!(encoding.ids, output.sequence);
    assert_eq!(tokenizer.decode(&encoding.ids).unwrap(), b"abababab");
}

#[test]
fn tokenizer_handles_unseen_bytes() {
    let output = train(b"abababab");
    let tokenizer = Tokenizer::from_grammar(&output.grammar).unwrap();

    let input: Vec<u8> = (0u8..=255).collect();
    let encoding = tokenizer.encode(&input).unwrap();
    assert_eq!(tokenizer.decode(&encoding.ids).unwrap(), input);
}

#[test]
fn fixed_point_is_stable() {
    for input in corpora() {
        let output = train(&input);
        let rerun = BpeTrainer::resume(
            TrainingConfig::default(),
            output.grammar.clone(),
            output.sequence.clone(),
        )
        .unwrap()
        .train(&CancellationToken::new())
        .unwrap();

        assert_eq!(rerun.merges, 0);
        assert_eq!(rerun.grammar, output.grammar);
        assert_eq!(rerun.sequence, output.sequence);
    }
}

#[test]
fn grammar_only_references_smaller_ids() {
    for input in corpora() {
        let output = train(&input);
        for (id, rule) in output.grammar.nonterminals() {
            assert!(rule.left < id);
            assert!(rule.right < id);
        }
    }
}

#[test]
fn training_is_deterministic() {
    let first = train(SHAKESPEARE);
    let second = train(SHAKESPEARE);

    assert_eq!(first.grammar, second.grammar);
    assert_eq!(first.sequence, second.sequence);
}

#[test]
fn saved_model_tokenizes_like_the_original() {
    let output = train(SHAKESPEARE);
    let dir = tempfile::tempdir().unwrap();

    ModelSaver::new(&output.grammar, &output.sequence)
        .save(dir.path(), ModelFormat::Binary)
        .unwrap();
    let model = ModelLoader::load(dir.path()).unwrap();
    assert_eq!(model.grammar, output.grammar);
    assert_eq!(model.sequence, output.sequence);

    let expanded: Vec<Symbol> = model.vocab.expand_sequence(&model.sequence).unwrap();
    let bytes: Vec<u8> = expanded.iter().map(|&s| s as u8).collect();
    assert_eq!(bytes, SHAKESPEARE);
}
