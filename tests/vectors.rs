// This file is dual licensed under the terms of the Apache License, Version
// 2.0, and the BSD License. See the LICENSE file in the root of this repository
// for complete details.

//! Integration tests against the OpenSSL-backed facade, exercising the
//! literal end-to-end vectors and boundary behaviors of spec §8 that
//! don't fit naturally as unit tests inside `opcua-crypto-core` (they
//! need a real `CryptoBackend`, not the in-tree `MockBackend`).
//!
//! The retrieved source (`original_source/tests/helpers/check_crypto_B256S256.c`)
//! embeds its certificate and RSA-key fixtures as hex string literals
//! (`DER_ASYM_PRIV_HEXA`, `DER_ASYM_PUB_HEXA`, and the `server.der`/
//! `cacert.der` blobs loaded in `setup_certificate()`/`setup_pki_stack()`),
//! not as binary files, so they're reproduced byte for byte below as the
//! `ASYM_PRIV_DER_HEX`, `SERVER_DER_HEX` and `CA_DER_HEX` constants.
//! `SERVER_DER_HEX`'s SHA-1 thumbprint matches spec §8 item 7's literal
//! `80968e5e796b36c6c5cc8546092c36f72137d8b0` exactly. `SERVER_DER_HEX`
//! and `CA_DER_HEX` are both from a fixture generated in 2017 and long expired by
//! any wall-clock date check, a fragility the original C suite's own test
//! comment already flagged ("is this a \"date\" problem?"); the
//! time-independent parts of item 8 (sanity check, thumbprint, DER
//! round-trip) are asserted against these literal bytes below, while the
//! live full-chain-validates-today assertion keeps fresh, always-valid
//! certificates built at run time with `openssl`'s X.509 builder.

use openssl::asn1::Asn1Time;
use openssl::bn::{BigNum, MsbOption};
use openssl::hash::MessageDigest;
use openssl::pkey::PKey;
use openssl::rsa::Rsa;
use openssl::x509::extension::BasicConstraints;
use openssl::x509::{X509NameBuilder, X509};

use opcua_crypto::{AsymmetricKey, CryptoProvider, KeyManager, OpensslBackend, PKIProvider, Policy};

/// `DER_ASYM_PRIV_HEXA` from `check_crypto_B256S256.c`: a 2048-bit RSA
/// private key in traditional (PKCS#1) DER encoding.
const ASYM_PRIV_DER_HEX: &str = "308204a40201000282010100cbe0cd29bbcdd824999fc5571122e7540405ac94d0a9b3ab3630ce2cf361d50d9e737ce3f7746959003cbe90fc1019dce4797f4a87a05cd83521531e1391cf11f2e49ce6b0f68db31fb91675be4bbd4380920fccf46518ac2bff42085ebc6ca107ecef53964e14617aecd75e1f27035c326f1757273047ca4d623bc5b08d278e3a320b964b11116df912bf91e99d3fdb78989e3daa144570647efc4c983c4159aecbf99aeb8bdfbf242ac5c43f0092a28aecddb8bdabf4aad7af68ae6bfe6d5cf6cb6e3a6a0c2d33ad3d592514703578d1cead67aa2c497600e0b9830ee8671f59f25262d596e4dbfe60ec6f5acb0c4f1cedf6b138fa12fd661b65e537c3539b020301000102820101009c87cb5d2868e1733053bfc29a508f052d5561ec9bcc3f3acb8f6b2c8dec66145fbc517e01866a3fbff3e368136f153c485a940597dde28ac937fdc5d0c6991231c79e436c48d0005ff1ce31b65a1644d658ce32d0cd31c536be736753bd1d36018cc32f0cee83ad5820b135fd7b099466d06e3e26c365cb07e0ccfd7a10d5f57879f21648083e9997cb1f78a3bd934dd472bafd852458e4fc843e14959d46cc2252e7bb12c0cfaee4623196595ce587921c600908e10c2e7257ea99a83c6df5b392220b88a11e3dcaf88c55a1a3ce8222037e19585cf644ccca65c188e7d109c447773c9e06cf15e2e2b745b0195d042cb264184d3b711d3e9e7e89858aa96102818100f2c690168005c536c5958a45ada4c1cad84203f961c560d996158d2b184d93f48934a0d46ec0512ee0670c2e49fda8b5de29fad03c3e5da406885a6d9775af2dfd5e61357997f2dbcaa087f79e076e95606904cfeab68185bbb4d2854d8f835e1eb38da5614b944970e8b5e4130262219f69394ede5c16e78112cfb3512b10b102818100d6fbd2ed02d9529b4e3a04a27da4659b2968d082cf660c0c4520cb1909084ff77ec38dccc74f924a0db25869855ea95e6c61990837c9a46658ce233104b1bd2b9d1c16221561f41116926bd963406f789cea1b730c326bd0e4cf01ebc6e2d047f2bbc591a5bfff19512186fbfcbfe1fa32776163a11bef64a8cd1316ba0a5c0b0281803b53787c771671e5fb8c9a7882816375fd38cc9dd15d9958328bdbae6f46ede3f0ef7269d7129a04198434fecec7f4c5549fef919957282ce007cc0941dcd94d24c03e8301ceb6e32cf5e3a407f30afbe7ce6205a8f6a65a16cf8e2e5310c1ea6b183781f56fb1b1ecac815e55a2dc7618ed6ebaae2dd4cf07c4a00ad2c7f25102818100c22e052f75024c9de0c380ca30081c8a5095ceb8489298d14063456f207c74964cd65f2f16dba57be3f131f065b9c1eb7aa390f11e4ab0868d31ec116b770b31e89fa4d236541a7a90d3c23c416cc302c360a5587e2cd0bb86dfff91323c4dfa9ea1c1eb33363f3963d18fb5ed6e77b3607ff9e45e71f8020881eafafd213c4f02818004fbb2f7ca0e8e7f644f40939f9743f8996439a9262442821981268f36fba3e4656fc6e9c69bab8b5f56c7b033bed95eeca96952b3d62edd935b80d5187649683196702a0b304e802de7841d6bab06e6877b74bdf2b5e7f2673ac6939c1427fb899a4cb26f656b5621914592f61b10d4ff50a4bb360d134d224a780db10f0f97";

/// The `server.der` fixture loaded by `setup_certificate()`: a
/// SHA-256-signed, 2048-bit RSA leaf certificate (`CN=INGOPCS_SERVER`)
/// issued by the `INGOPCS CA` below.
const SERVER_DER_HEX: &str = "308204bb308202a3a003020102020102300d06092a864886f70d01010b0500308188310b3009060355040613024652310c300a06035504080c03494446310e300c06035504070c0550415249533110300e060355040a0c07494e474f5043533110300e060355040b0c07494e474f5043533113301106035504030c0a494e474f5043532043413122302006092a864886f70d0109011613696e676f70637340737973746572656c2e6672301e170d3137303532323132343431335a170d3138303532323132343431335a3057310b3009060355040613024652310c300a06035504080c03494446310e300c06035504070c0550415249533111300f060355040a0c08535953544552454c3117301506035504030c0e494e474f5043535f53455256455230820122300d06092a864886f70d01010105000382010f003082010a0282010100ad9921f924639e125c0cde520755f44028d65eaecaf16867823be446b977e0631d64509953b7fe467d1afc449bca6edfe11e1e6d71207c33e2250f3c66875d369a1cda02efc661e73bdf01c517470f2a09ea500b56842fcb125779917b8deb58dc6f2f9511e66c29ba57a69435bc3aab1a23982f531ec763f494ef8b6c6360ea194d7ca2efd777b9a32c295809cf39d2c2ed0dbfc4bfd6fbd24bf782f8d83795cb51964e1dd0a8cdd8f2a0ef2fd0d2b126eb8fc00f00411f362cd4e30a0a20cde108efa69faede8d9f756838306569c6ea27f1ba5aefac790ff18bcbcc81d7acaa1fac2acede3acd2a61d7b62f202c7bab7df08ee2241a0f08dffdb62914cf210203010001a360305e301d0603551d0e04160414a3f8e031d1f6f412bace4ddf0eeb62da209d3c79301f0603551d2304183016801478a2ae09c2287523d9b20f7fb31293ecf5ce2d14300f0603551d130101ff040530030101ff300b0603551d0f040403020106300d06092a864886f70d01010b050003820201003375d0fef58f5d7fcea8ac5a7aa9f94aacab123925f0298ee5b8f81df188e149df1e7771539437bef947dcd90dc12bd42ae185e715d7633ba4386d99e39e11c012b998a2f127a6e515f7fa657346518332f00ae4320d03d461f6bff99240e54093c6bf98f24747f9a2080ea6391d6fd34f85a7daae1c1c10c21129950542f89715ef2fc11d2c73982bdbbeac58627b13c8702ee9dacccd4b8b903bc9834beb4c898d8a70b323dadd7db8235146c0ed0aa26eda611a0fb1c5ea7cd97928317d6735945dbe16fb72c5477b9403a7e34e7528090e37543e988fdf3fc72669991c8161b6e8cd9231c987a8bd35541d646a6ff3146b229f53b8c650df69d1aa7b29207625c443a8f4fc87cb848abc5937c1b230d9b940386f11c35318659ef6712424f7d21943fe7ad3b6acbe15cd903a33b396c755661967a31026576220a547b43e3f8f2e4df13c14f8250c02a56b4add9fc1f503bc7d8a8573909d8e9d3c5a008be8170b528711cc0084072ad6839b52881e613c9c8121415a4c8bcdd6e4d448616e003addd166727c198735601abd2526b2fe9cd3158df9b258ef3101f8ddeaf2b36e8d7f6348dea70e3f5d69f8e1b4ebe8156405f55692e9342630264f1dc948a4095da188cd50e7f8cd30fce5232cb564dc0bef2d761e12f5dde9ac93a81f67fae30d251a59f578dd6aaa7d3edbc81387dae9d67ee148d1662ca139446a8de3";

/// The `cacert.der` fixture loaded by `setup_pki_stack()`: the
/// self-signed `INGOPCS CA` root that signed `SERVER_DER_HEX`.
const CA_DER_HEX: &str = "308205f5308203dda003020102020900a5d3e9dfcf8e3f74300d06092a864886f70d01010b0500308188310b3009060355040613024652310c300a06035504080c03494446310e300c06035504070c0550415249533110300e060355040a0c07494e474f5043533110300e060355040b0c07494e474f5043533113301106035504030c0a494e474f5043532043413122302006092a864886f70d0109011613696e676f70637340737973746572656c2e6672301e170d3137303532323132333134365a170d3230303231363132333134365a308188310b3009060355040613024652310c300a06035504080c03494446310e300c06035504070c0550415249533110300e060355040a0c07494e474f5043533110300e060355040b0c07494e474f5043533113301106035504030c0a494e474f5043532043413122302006092a864886f70d0109011613696e676f70637340737973746572656c2e667230820222300d06092a864886f70d01010105000382020f003082020a028202010095dee52dfa083d805290adbbaa426d2d06cf2b2ac3b80e3405c9671057a5ceff4c0ba7c5def83fbdeb9a068cb0bf8b9432288690085d9c6b0fce95a8b427d5a4e5ecd9bb20b1d07683abac38df75d31a54eddd2e01eb496409fa65f37b11fea245f2d155d253b665443a5077e33cc73f8e895cbd42f9914f9542ee4bf0f84da2b26b1feab00a937e45f44431ccfe24a431a35e9177f643f7a6517fa19ce31ec707ed970a480bb2532a9f7a209d5057c709c5ef7f5a62c796bff9d8c5a0d38581e1ed2497e05cff1da8c3ba36c867e47d825daee0e0a57ece5c04c208de69ae4ecf831b2ba628de4ddd61202c77ab1edb936b84ac3f2edf7a46f0d110901636fab5cd612acc98e181a42a20ad8b080be80196f72b8550ccd5e4c5843e555b25eea8b2135f0410b7f070071b61027b5b14f836737404cc4a23c96535ca99e3c987d59d612be96b8c2f3d142ba2f4b64af96bd74f6473fac57d3e14e40762721e030bb8020f0194ac226a17e86beaf4d84cfe79d394fe2c8be7753356aa116234b5e71b8b44964f1bf957184973f8427dcca50d4563f1e823b05a37cd4ab40fd210bc51b1ad14c3962d8defb5e6342abf6c4388f9fb299588d639b97a336f9ae465da3479460dcf99944175dc148949e178a466b9e1bdf56d249ff8afe1bdceed9f714d94d3fd27a78933b511f55cf549cfad8190e8dbd54ae292d64fc5580a34730203010001a360305e301d0603551d0e0416041478a2ae09c2287523d9b20f7fb31293ecf5ce2d14301f0603551d2304183016801478a2ae09c2287523d9b20f7fb31293ecf5ce2d14300f0603551d130101ff040530030101ff300b0603551d0f040403020106300d06092a864886f70d01010b050003820201007307149108131cf30e577bcc5326791d8cea6354516b8c59e4a4cdd88f9f0f14cb9794b3537e5445e1234d6d133f96fff97562fd4815540dba252d4174d08499809ba4b018f2584ecb0ee4657ded621030213425a6441986cf69070bb78bd29da1e463f3bccd3abdef9b0f95ef61293ff15a07338a6b50f9d85b4f1f23ba2568c4a8ca7bd455e525d34047ae918f91b9692e09869d1767a5b7d1c35ed0f3469b08bd3aa07f09f8f596ce6a5b1ab117625bea466cb21af93c97005e5bb89c83039e1af4c34fc8ed6001a86990c38b47d19a32039851134d8d4cf50680445f5a86dab3396ad03c18c3c2ab7676a04be94347a6f3c1a5c2fd709287a64635e374b844185276978a23a564931e8b0c295b6e24004f5a883e56216f75281fa76506a2e2cf9ab00faf629e2fac43f6a3af49bd9326092c87411a3900d962626051d650e6daf00e3d307f43487813718d302fdb1dc1db0924920641bd0e57148c1e7fb0162649d7e631b7035961b5c64b845a42fbb16476ccea083fe6a496d5cf501683e39488a31fa5f2f82ae85ba3194486def2b90341a72beb797c082a950116a51bce080faced2b22ab78b46aa45c7db37aab808b4482ccaf55352bc6f6d82c26787b477b8245d17aee497253724b25ca941782133382164b33fa2140c978a2cd72c59a567f60b76f4208333c5fe2224ca37e702f42a317148895383afb8f581493";

fn provider(policy: Policy) -> CryptoProvider<'static> {
    static BACKEND: OpensslBackend = OpensslBackend;
    CryptoProvider::from_policy(&BACKEND, policy).expect("policy is one of the three supported")
}

fn self_signed_ca() -> (X509, PKey<openssl::pkey::Private>) {
    let rsa = Rsa::generate(2048).unwrap();
    let pkey = PKey::from_rsa(rsa).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", "opcua-crypto test CA").unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let mut serial = BigNum::new().unwrap();
    serial.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();
    builder.set_serial_number(&serial.to_asn1_integer().unwrap()).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder.set_pubkey(&pkey).unwrap();
    builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
    builder.set_not_after(&Asn1Time::days_from_now(3650).unwrap()).unwrap();
    builder.append_extension(BasicConstraints::new().ca().build().unwrap()).unwrap();
    builder.sign(&pkey, MessageDigest::sha256()).unwrap();
    (builder.build(), pkey)
}

fn leaf_signed_by(ca_cert: &X509, ca_key: &PKey<openssl::pkey::Private>) -> X509 {
    let rsa = Rsa::generate(2048).unwrap();
    let pkey = PKey::from_rsa(rsa).unwrap();

    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", "opcua-crypto test server").unwrap();
    let name = name.build();

    let mut builder = X509::builder().unwrap();
    builder.set_version(2).unwrap();
    let mut serial = BigNum::new().unwrap();
    serial.rand(64, MsbOption::MAYBE_ZERO, false).unwrap();
    builder.set_serial_number(&serial.to_asn1_integer().unwrap()).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(ca_cert.subject_name()).unwrap();
    builder.set_pubkey(&pkey).unwrap();
    builder.set_not_before(&Asn1Time::days_from_now(0).unwrap()).unwrap();
    builder.set_not_after(&Asn1Time::days_from_now(3650).unwrap()).unwrap();
    // SHA-256 leaf signature, required by both active policies' sanity check.
    builder.sign(ca_key, MessageDigest::sha256()).unwrap();
    builder.build()
}

#[test]
fn aes256_cbc_matches_the_literal_zero_key_vector() {
    let provider = provider(Policy::Basic256Sha256);
    let key = opcua_crypto::SecretBuffer::from_vec(vec![0u8; 32]);
    let iv = opcua_crypto::SecretBuffer::from_vec(vec![0u8; 16]);
    let plain = vec![0u8; 16];

    let cipher = provider.symmetric_encrypt(&plain, &key, &iv).unwrap();
    assert_eq!(hex::encode(&cipher), "dc95c078a2408989ad48a21492842087");
    assert_eq!(provider.symmetric_decrypt(&cipher, &key, &iv).unwrap(), plain);
}

#[test]
fn p_sha256_matches_the_literal_vector() {
    let provider = provider(Policy::Basic256Sha256);
    let secret = hex::decode("9bbe436ba940f017b17652849a71db35").unwrap();
    let mut seed = b"test label".to_vec();
    seed.extend(hex::decode("a0ba9f936cda311827a6f796ffd5198c").unwrap());

    let out = provider.derive_pseudo_random_data(&secret, &seed, 100).unwrap();
    let expected = hex::decode(
        "e3f229ba727be17b8d122620557cd453c2aab21d07c3d495329b52d4e61edb5a6b301791e90d35c9c9a46b4e14baf9af0fa022f7077def17abfd3797c0564bab4fbc91666e9def9b97fce34f796789baa48082d122ee42c5a72e5a5110fff70187347b66"
    ).unwrap();
    assert_eq!(out, expected);
}

#[test]
fn derive_key_sets_matches_the_literal_vector() {
    let provider = provider(Policy::Basic256Sha256);
    let client_nonce = hex::decode("3d3b4768f275d5023c2145cbe3a4a592fb843643d791f7bd7fce75ff25128b68").unwrap();
    let server_nonce = hex::decode("ccee418cbc77c2ebb38d5ffac9d2a9d0a6821fa211798e71b2d65b3abb6aec8f").unwrap();

    let (sign_len, crypto_len, iv_len) = provider.derive_lengths().unwrap();
    let mut client_set = opcua_crypto::SecurityKeySet::zeroed(sign_len, crypto_len, iv_len);
    let mut server_set = opcua_crypto::SecurityKeySet::zeroed(sign_len, crypto_len, iv_len);
    provider
        .derive_key_sets(&client_nonce, &server_nonce, &mut client_set, &mut server_set)
        .unwrap();

    assert_eq!(hex::encode(&*client_set.sign_key.expose()), "86842427475799fa782efa5c63f5eb6f0b6dbf8a549dd5452247feaa5021714b");
    assert_eq!(hex::encode(&*client_set.crypto_key.expose()), "d8de10ac4fb579f2718ddcb50ea68d1851c76644b26454e3f9339958d23429d5");
    assert_eq!(hex::encode(&*client_set.iv.expose()), "4167de62880e0bdc023aa133965c34ff");
    assert_eq!(hex::encode(&*server_set.sign_key.expose()), "f6db2ad48ad3776f83086b47e9f905ee00193f87e85ccde0c3bf7eb8650e236e");
    assert_eq!(hex::encode(&*server_set.crypto_key.expose()), "2c86aecfd5629ee05c49345bce3b2a7ca959a0bf4c9c281b8516a369650dbc4e");
    assert_eq!(hex::encode(&*server_set.iv.expose()), "39a4f596bcbb99e0b48114f60fc6af21");
}

#[test]
fn rsa_oaep_round_trips_a_32_byte_padded_message() {
    let provider = provider(Policy::Basic256Sha256);
    let pkey = PKey::private_key_from_der(&hex::decode(ASYM_PRIV_DER_HEX).unwrap()).unwrap();
    let key: AsymmetricKey<'_> = AsymmetricKey::Owned(pkey);

    let mut plain = b"Test INGOPCS Test".to_vec();
    plain.resize(32, 0);

    let cipher = provider.asymmetric_encrypt(&plain, &key).unwrap();
    assert_eq!(cipher.len(), 256);
    let decrypted = provider.asymmetric_decrypt(&cipher, &key).unwrap();
    assert_eq!(decrypted, plain);
}

#[test]
fn rsa_pkcs1_sha256_signs_verifies_and_rejects_mutation() {
    let provider = provider(Policy::Basic256Sha256);
    let pkey = PKey::private_key_from_der(&hex::decode(ASYM_PRIV_DER_HEX).unwrap()).unwrap();
    let key: AsymmetricKey<'_> = AsymmetricKey::Owned(pkey);

    let mut data = vec![0x5au8; 32];
    data.extend(vec![0xa5u8; 500]);

    let signature = provider.asymmetric_sign(&data, &key).unwrap();
    assert!(provider.asymmetric_verify(&data, &key, &signature).is_ok());

    let mut mutated = signature.clone();
    mutated[0] ^= 1;
    assert!(provider.asymmetric_verify(&data, &key, &mutated).is_err());
}

#[test]
fn asymmetric_key_der_round_trips() {
    let backend = OpensslBackend;
    let manager = KeyManager::new(&backend);
    let der = hex::decode(ASYM_PRIV_DER_HEX).unwrap();

    let key = manager.create_asymmetric_key_from_buffer(&der).unwrap();
    let round_tripped = manager.write_key_to_der(&key).unwrap();
    assert_eq!(round_tripped, der);
}

#[test]
fn certificate_der_round_trips_and_thumbprint_is_20_bytes() {
    let backend = OpensslBackend;
    let manager = KeyManager::new(&backend);
    let (ca_cert, _ca_key) = self_signed_ca();
    let der = ca_cert.to_der().unwrap();

    let cert = manager.create_certificate_from_der(&der).unwrap();
    assert_eq!(manager.copy_certificate_der(&cert), der);

    let provider = provider(Policy::Basic256Sha256);
    let thumb_a = provider.compute_certificate_thumbprint(&cert).unwrap();
    let thumb_b = provider.compute_certificate_thumbprint(&cert).unwrap();
    assert_eq!(thumb_a.len(), 20);
    assert_eq!(thumb_a, thumb_b);
}

#[test]
fn server_der_round_trips_and_matches_the_literal_thumbprint() {
    let backend = OpensslBackend;
    let manager = KeyManager::new(&backend);
    let der = hex::decode(SERVER_DER_HEX).unwrap();

    let cert = manager.create_certificate_from_der(&der).unwrap();
    assert_eq!(manager.copy_certificate_der(&cert), der);

    let provider = provider(Policy::Basic256Sha256);
    let thumb = provider.compute_certificate_thumbprint(&cert).unwrap();
    assert_eq!(hex::encode(thumb), "80968e5e796b36c6c5cc8546092c36f72137d8b0");
}

#[test]
fn server_der_passes_sanity_check_under_both_active_policies_and_fails_under_none() {
    let backend = OpensslBackend;
    let manager = KeyManager::new(&backend);
    let cert = manager.create_certificate_from_der(&hex::decode(SERVER_DER_HEX).unwrap()).unwrap();

    // Sanity check only inspects the key type/bit-length and the
    // signing digest, none of which depend on the current date, so this
    // holds even though the fixture's own validity window (2017-2018)
    // has long since elapsed.
    assert!(provider(Policy::Basic256Sha256).certificate_sanity_check(&cert).is_ok());
    assert!(provider(Policy::Basic256).certificate_sanity_check(&cert).is_ok());

    let none_provider = CryptoProvider::create(&backend, "http://opcfoundation.org/UA/SecurityPolicy#None").unwrap();
    assert!(none_provider.certificate_sanity_check(&cert).is_err());
}

#[test]
fn certificate_validates_under_both_active_policies_and_rejects_under_none() {
    let backend = OpensslBackend;
    let manager = KeyManager::new(&backend);
    let (ca_cert, ca_key) = self_signed_ca();
    let leaf_cert = leaf_signed_by(&ca_cert, &ca_key);

    let ca = manager.create_certificate_from_der(&ca_cert.to_der().unwrap()).unwrap();
    let leaf = manager.create_certificate_from_der(&leaf_cert.to_der().unwrap()).unwrap();
    let pki: PKIProvider<'_, '_> = PKIProvider::create(&backend, &ca, None);

    assert!(provider(Policy::Basic256Sha256).validate_certificate(&leaf, &pki).is_ok());
    assert!(provider(Policy::Basic256).validate_certificate(&leaf, &pki).is_ok());

    let none_provider = CryptoProvider::create(&backend, "http://opcfoundation.org/UA/SecurityPolicy#None").unwrap();
    // The `None` profile's certificate-sanity check always fails (no
    // bit-bounds, no digest allow-list to consult), matching spec §8's
    // boundary behavior "under None, every primitive except random
    // generation returns invalid-parameter".
    assert!(none_provider.validate_certificate(&leaf, &pki).is_err());
}

#[test]
fn server_der_chain_against_ca_der_fails_only_on_the_expired_validity_window() {
    let backend = OpensslBackend;
    let manager = KeyManager::new(&backend);
    let ca = manager.create_certificate_from_der(&hex::decode(CA_DER_HEX).unwrap()).unwrap();
    let server = manager.create_certificate_from_der(&hex::decode(SERVER_DER_HEX).unwrap()).unwrap();
    let pki: PKIProvider<'_, '_> = PKIProvider::create(&backend, &ca, None);

    // The fixture's own issuer/signature chain is intact (server.der was
    // genuinely signed by cacert.der); sanity check passes. The chain
    // builder still rejects it because both certificates' `notAfter`
    // elapsed years before any date this suite can run on, exactly the
    // fragility the original C suite's "is this a \"date\" problem?"
    // comment anticipated.
    let provider = provider(Policy::Basic256Sha256);
    assert!(provider.certificate_sanity_check(&server).is_ok());
    assert!(provider.validate_certificate(&server, &pki).is_err());
}

#[test]
fn certificate_public_key_borrowed_from_it_reports_its_bit_length() {
    let backend = OpensslBackend;
    let manager = KeyManager::new(&backend);
    let (ca_cert, _ca_key) = self_signed_ca();
    let cert = manager.create_certificate_from_der(&ca_cert.to_der().unwrap()).unwrap();

    let public_key = manager.get_certificate_public_key(&cert).unwrap();
    assert!(public_key.is_borrowed());
    let provider = provider(Policy::Basic256Sha256);
    assert_eq!(provider.asymmetric_key_bits(&public_key).unwrap(), 2048);
}

#[test]
fn a_null_or_unknown_uri_yields_no_provider() {
    let backend = OpensslBackend;
    assert!(CryptoProvider::create(&backend, "").is_none());
    assert!(CryptoProvider::create(&backend, "http://example.com/bogus").is_none());
}

#[test]
fn a_1024_bit_key_is_in_window_for_basic256_but_not_basic256sha256() {
    let key: AsymmetricKey<'_> = AsymmetricKey::Owned(PKey::from_rsa(Rsa::generate(1024).unwrap()).unwrap());
    let data = b"boundary check";

    assert!(provider(Policy::Basic256).asymmetric_sign(data, &key).is_ok());
    assert!(provider(Policy::Basic256Sha256).asymmetric_sign(data, &key).is_err());
}

#[test]
fn a_2048_bit_key_is_the_floor_for_basic256sha256() {
    let key: AsymmetricKey<'_> = AsymmetricKey::Owned(PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap());
    assert!(provider(Policy::Basic256Sha256).asymmetric_sign(b"boundary check", &key).is_ok());
}
