#![no_main]

use intcode::{codegen::listing, program::parser::parse};
use intcode_fuzz::listing_string::ListingString;
use libfuzzer_sys::{fuzz_target, Corpus};

fuzz_target!(|source: ListingString| -> Corpus {
	let Ok(image) = parse(&source) else { return Corpus::Reject };

	let _ = listing::write(&mut std::io::sink(), &image);

	Corpus::Keep
});
