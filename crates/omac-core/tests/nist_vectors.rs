//! NIST SP 800-38B CMAC examples for AES-128, AES-192 and AES-256.

use block_core::Aes;
use omac_core::Cmac;

const MESSAGE: &str = "6bc1bee22e409f96e93d7e117393172a\
                       ae2d8a571e03ac9c9eb76fac45af8e51\
                       30c81c46a35ce411e5fbc1191a0a52ef\
                       f69f2445df4f9b17ad2b417be66c3710";

struct Case {
    key: &'static str,
    tags: [&'static str; 4],
}

const LENGTHS: [usize; 4] = [0, 16, 40, 64];

const CASES: [Case; 3] = [
    Case {
        key: "2b7e151628aed2a6abf7158809cf4f3c",
        tags: [
            "bb1d6929e95937287fa37d129b756746",
            "070a16b46b4d4144f79bdd9dd04a287c",
            "dfa66747de9ae63030ca32611497c827",
            "51f0bebf7e3b9d92fc49741779363cfe",
        ],
    },
    Case {
        key: "8e73b0f7da0e6452c810f32b809079e562f8ead2522c6b7b",
        tags: [
            "d17ddf46adaacde531cac483de7a9367",
            "9e99a7bf31e710900662f65e617c5184",
            "8a1de5be2eb31aad089a82e6ee908b0e",
            "a1d5df0eed790f794d77589659f39a11",
        ],
    },
    Case {
        key: "603deb1015ca71be2b73aef0857d77811f352c073b6108d72d9810a30914dff4",
        tags: [
            "028962f61b7bf89efc6b551f4667d983",
            "28a7023f452e8f82bd4bf28d8c37c35c",
            "aaf3d8f1de5640c232f5b169b9c911e6",
            "e1992190549f6ed5696a2c056c315410",
        ],
    },
];

#[test]
fn aes_cmac_matches_published_tags() {
    let message = hex::decode(MESSAGE).expect("hex");
    for case in &CASES {
        let cipher = Aes::new(&hex::decode(case.key).expect("hex")).expect("valid key");
        let mut mac = Cmac::new(cipher).expect("supported");
        for (len, expected) in LENGTHS.iter().zip(case.tags.iter()) {
            mac.reset();
            mac.update(&message[..*len]);
            assert_eq!(
                hex::encode(mac.finalize()),
                *expected,
                "key {} length {}",
                case.key,
                len
            );
        }
    }
}

#[test]
fn published_tags_verify_when_truncated() {
    let message = hex::decode(MESSAGE).expect("hex");
    let case = &CASES[2];
    let cipher = Aes::new(&hex::decode(case.key).expect("hex")).expect("valid key");
    let mut mac = Cmac::new(cipher).expect("supported");
    mac.update(&message);
    let tag = hex::decode(case.tags[3]).expect("hex");
    for len in 1..=tag.len() {
        assert!(mac.verify(&tag[..len]).is_ok(), "truncated to {len}");
    }
}
