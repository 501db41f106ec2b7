//! Built-in object behaviour: Array, String, Number, Math, JSON, Date,
//! RegExp, errors and the host modules.

use super::{run_test_actions, TestAction};
use crate::JsNativeErrorKind;
use indoc::indoc;

#[test]
fn array_basics() {
    run_test_actions([
        TestAction::assert_eq("[1, 2, 3].join('-')", "1-2-3"),
        TestAction::assert_eq("var a = [1]; a.push(2, 3); a.join('')", "123"),
        TestAction::assert_eq("[1, 2, 3].pop()", 3),
        TestAction::assert_eq("var a = [1, 2]; a.pop(); a.length", 1),
        TestAction::assert_eq("[1, 2, 3].shift()", 1),
        TestAction::assert_eq("var a = [2]; a.unshift(1); a.join('')", "12"),
        TestAction::assert_eq("[1, 2, 3, 4].slice(1, 3).join('')", "23"),
        TestAction::assert_eq("[1, 2, 3, 4].slice(-2).join('')", "34"),
        TestAction::assert_eq("[3, 1, 2].sort().join('')", "123"),
        TestAction::assert_eq("[1, 2, 10].sort().join(',')", "1,10,2"),
        TestAction::assert_eq(
            "[1, 2, 10].sort(function(a, b) { return a - b; }).join(',')",
            "1,2,10",
        ),
        TestAction::assert_eq("[1, 2, 3].reverse().join('')", "321"),
        TestAction::assert_eq("[1, [2, 3], 4].concat(5, [6]).join('')", "12,3456"),
        TestAction::assert_eq("[0, 1, 2, 1].indexOf(1)", 1),
        TestAction::assert_eq("[0, 1, 2, 1].lastIndexOf(1)", 3),
        TestAction::assert_eq("[0, 1].indexOf(5)", -1),
        TestAction::assert("[NaN].includes(NaN)"),
        TestAction::assert("![NaN].indexOf(NaN) >= 0"),
    ]);
}

#[test]
fn array_splice() {
    run_test_actions([
        TestAction::assert_eq(
            "var a = [1, 2, 3, 4]; a.splice(1, 2).join('') + ';' + a.join('')",
            "23;14",
        ),
        TestAction::assert_eq(
            "var a = [1, 4]; a.splice(1, 0, 2, 3); a.join('')",
            "1234",
        ),
    ]);
}

#[test]
fn array_iteration_methods() {
    run_test_actions([
        TestAction::assert_eq("[1, 2, 3].map(function(v) { return v * 2; }).join('')", "246"),
        TestAction::assert_eq(
            "[1, 2, 3, 4].filter(function(v) { return v % 2 === 0; }).join('')",
            "24",
        ),
        TestAction::assert_eq(
            "[1, 2, 3].reduce(function(p, v) { return p + v; })",
            6,
        ),
        TestAction::assert_eq(
            "[1, 2, 3].reduce(function(p, v) { return p + v; }, 10)",
            16,
        ),
        TestAction::assert_eq(
            "['a', 'b'].reduceRight(function(p, v) { return p + v; })",
            "ba",
        ),
        TestAction::assert("[1, 2, 3].some(function(v) { return v === 2; })"),
        TestAction::assert("[2, 4].every(function(v) { return v % 2 === 0; })"),
        TestAction::assert_eq("[5, 10, 15].find(function(v) { return v > 7; })", 10),
        TestAction::assert_eq("[5, 10, 15].findIndex(function(v) { return v > 7; })", 1),
        TestAction::assert_eq(
            "var calls = 0; [, , ,].forEach(function() { calls++; }); calls",
            0,
        ),
        TestAction::assert_native_error(
            "[].reduce(function() {});",
            JsNativeErrorKind::Type,
            "Reduce of empty array with no initial value",
        ),
        TestAction::assert_eq(
            "[1, 2, 3].map(function(v, i, a) { return v + i; }).join('')",
            "135",
        ),
    ]);
}

#[test]
fn reduce_over_an_array_shortened_by_the_callback() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var a = [1, 2, 3];
            a.reduce(function(p, v, i, arr) { arr.shift(); return p + v; })
        "#},
        3,
    )]);
}

#[test]
fn string_methods() {
    run_test_actions([
        TestAction::assert_eq("'hello'.charAt(1)", "e"),
        TestAction::assert_eq("'hello'.charAt(9)", ""),
        TestAction::assert_eq("'abc'.charCodeAt(0)", 97),
        TestAction::assert_eq("'abc'.indexOf('bc')", 1),
        TestAction::assert_eq("'abcabc'.lastIndexOf('bc')", 4),
        TestAction::assert("'hello'.includes('ell')"),
        TestAction::assert("'hello'.startsWith('he')"),
        TestAction::assert("'hello'.endsWith('lo')"),
        TestAction::assert_eq("'hello'.slice(1, 3)", "el"),
        TestAction::assert_eq("'hello'.slice(-3)", "llo"),
        TestAction::assert_eq("'hello'.substring(3, 1)", "el"),
        TestAction::assert_eq("'hello'.substr(1, 3)", "ell"),
        TestAction::assert_eq("'ab'.repeat(3)", "ababab"),
        TestAction::assert_eq("'  x  '.trim()", "x"),
        TestAction::assert_eq("'5'.padStart(3, '0')", "005"),
        TestAction::assert_eq("'5'.padEnd(3, '*')", "5**"),
        TestAction::assert_eq("'MiXeD'.toLowerCase()", "mixed"),
        TestAction::assert_eq("'MiXeD'.toUpperCase()", "MIXED"),
        TestAction::assert_eq("'a,b,,c'.split(',').join('|')", "a|b||c"),
        TestAction::assert_eq("'abc'.split('').join('-')", "a-b-c"),
        TestAction::assert_eq("'x'.concat('y', 1)", "xy1"),
        TestAction::assert_eq("String.fromCharCode(104, 105)", "hi"),
        TestAction::assert_eq("String.fromCodePoint(129408)", "🦀"),
        TestAction::assert_eq("String(123.5)", "123.5"),
        TestAction::assert_eq("String(Symbol('tag'))", "Symbol(tag)"),
    ]);
}

#[test]
fn string_char_at_matches_indexing() {
    run_test_actions([TestAction::assert(
        indoc! {r#"
            var s = 'aβc🦀e';
            var ok = true;
            for (var i = 0; i < s.length; i++) {
                ok = ok && s[i] === s.charAt(i);
            }
            ok && s.charAt(s.length) === '' && s[s.length] === undefined
        "#},
    )]);
}

#[test]
fn string_replace() {
    run_test_actions([
        TestAction::assert_eq("'aaa'.replace('a', 'b')", "baa"),
        TestAction::assert_eq("'aaa'.replace(/a/g, 'b')", "bbb"),
        TestAction::assert_eq("'john smith'.replace(/(\\w+) (\\w+)/, '$2 $1')", "smith john"),
        TestAction::assert_eq("'price: 5'.replace(/\\d/, '$&$&')", "price: 55"),
        TestAction::assert_eq(
            "'abc'.replace('b', function(m) { return m.toUpperCase(); })",
            "aBc",
        ),
    ]);
}

#[test]
fn regexp_exec_and_friends() {
    run_test_actions([
        TestAction::assert("/ab+c/.test('xabbbcx')"),
        TestAction::assert("!/^ab$/.test('xabx')"),
        TestAction::assert_eq("/b(.)/.exec('abc')[1]", "c"),
        TestAction::assert_eq("/b(.)/.exec('abc').index", 1),
        TestAction::assert_eq("/x/.exec('abc') === null", true),
        TestAction::assert_eq("'a1b2c3'.match(/\\d/g).join('')", "123"),
        TestAction::assert_eq("'a1b2'.match(/x/) === null", true),
        TestAction::assert_eq("'hello world'.search(/world/)", 6),
        TestAction::assert_eq("'one1two22three'.split(/\\d+/).join(',')", "one,two,three"),
        TestAction::assert_eq("/ab/g.toString()", "/ab/g"),
        TestAction::assert_eq("new RegExp('a(b)', 'i').exec('AB')[1]", "B"),
        TestAction::assert_eq(
            "var re = /\\d/g; re.exec('a1b2'); re.lastIndex",
            2,
        ),
        TestAction::assert_eq("/a/.source + ';' + /a/i.flags", "a;i"),
        TestAction::assert("/a/g.global && !/a/.global"),
    ]);
}

#[test]
fn number_formatting() {
    run_test_actions([
        TestAction::assert_eq("(255).toString(16)", "ff"),
        TestAction::assert_eq("(8).toString(2)", "1000"),
        TestAction::assert_eq("(3.14159).toFixed(2)", "3.14"),
        TestAction::assert_eq("(2).toFixed(0)", "2"),
        TestAction::assert_eq("(12345.6789).toPrecision(5)", "12346"),
        TestAction::assert_eq("(1234.5).toExponential(2)", "1.23e+3"),
        TestAction::assert_native_error(
            "(1).toFixed(200);",
            JsNativeErrorKind::Range,
            "toFixed() digits argument must be between 0 and 100",
        ),
        TestAction::assert_eq("String(0.1 + 0.2)", "0.30000000000000004"),
        TestAction::assert_eq("String(1e21)", "1e+21"),
        TestAction::assert("Number.isInteger(4) && !Number.isInteger(4.5)"),
        TestAction::assert("Number('  42  ') === 42"),
        TestAction::assert("Number('0x10') === 16"),
        TestAction::assert("isNaN(Number('12abc'))"),
        TestAction::assert("Number('') === 0"),
    ]);
}

#[test]
fn number_string_round_trip() {
    run_test_actions([TestAction::assert(
        indoc! {r#"
            var samples = [0, 1, -1, 0.5, 123.456, 1e-7, 3.141592653589793, 1e21, 4294967295];
            var ok = true;
            for (var i = 0; i < samples.length; i++) {
                ok = ok && Number(String(samples[i])) === samples[i];
            }
            ok
        "#},
    )]);
}

#[test]
fn parse_int_and_float() {
    run_test_actions([
        TestAction::assert_eq("parseInt('42')", 42),
        TestAction::assert_eq("parseInt('42px')", 42),
        TestAction::assert_eq("parseInt('0x1f')", 31),
        TestAction::assert_eq("parseInt('11', 2)", 3),
        TestAction::assert_eq("parseInt('-7')", -7),
        TestAction::assert("isNaN(parseInt('px'))"),
        TestAction::assert_eq("parseFloat('3.5rem')", 3.5),
        TestAction::assert_eq("parseFloat('1e3')", 1000),
        TestAction::assert("isNaN(parseFloat('x'))"),
    ]);
}

#[test]
fn math_functions() {
    run_test_actions([
        TestAction::assert_eq("Math.max(1, 5, 3)", 5),
        TestAction::assert_eq("Math.min(1, -5, 3)", -5),
        TestAction::assert_eq("Math.max()", f64::NEG_INFINITY),
        TestAction::assert("isNaN(Math.max(1, NaN))"),
        TestAction::assert_eq("Math.floor(1.9)", 1),
        TestAction::assert_eq("Math.ceil(1.1)", 2),
        TestAction::assert_eq("Math.round(2.5)", 3),
        TestAction::assert_eq("Math.round(-2.5)", -2),
        TestAction::assert_eq("Math.trunc(-1.9)", -1),
        TestAction::assert_eq("Math.abs(-3)", 3),
        TestAction::assert_eq("Math.sqrt(16)", 4),
        TestAction::assert_eq("Math.pow(2, 10)", 1024),
        TestAction::assert_eq("Math.sign(-9)", -1),
        TestAction::assert_eq("Math.clz32(1)", 31),
        TestAction::assert_eq("Math.imul(3, 4)", 12),
        TestAction::assert("Math.random() >= 0 && Math.random() < 1"),
        TestAction::assert("Math.PI > 3.14 && Math.PI < 3.15"),
    ]);
}

#[test]
fn json_stringify() {
    run_test_actions([
        TestAction::assert_eq("JSON.stringify({a: 1, b: 'x'})", r#"{"a":1,"b":"x"}"#),
        TestAction::assert_eq("JSON.stringify([1, 'a', true, null])", r#"[1,"a",true,null]"#),
        TestAction::assert_eq("JSON.stringify('tab\\tend')", r#""tab\tend""#),
        TestAction::assert_eq("JSON.stringify('ctrl\\u0001')", "\"ctrl\\u0001\""),
        TestAction::assert_eq("JSON.stringify(-0)", "0"),
        TestAction::assert_eq("JSON.stringify(NaN)", "null"),
        TestAction::assert_eq("JSON.stringify(undefined) === undefined", true),
        TestAction::assert_eq("JSON.stringify({f: function() {}, a: 1})", r#"{"a":1}"#),
        TestAction::assert_eq("JSON.stringify([function() {}])", "[null]"),
        TestAction::assert_eq(
            "JSON.stringify({v: {toJSON: function() { return 5; }}})",
            r#"{"v":5}"#,
        ),
        TestAction::assert_eq(
            "JSON.stringify({a: 1, b: 2}, ['a'])",
            r#"{"a":1}"#,
        ),
        TestAction::assert_eq(
            indoc! {r#"
                JSON.stringify({a: 1}, function(k, v) {
                    return typeof v === 'number' ? v * 10 : v;
                })
            "#},
            r#"{"a":10}"#,
        ),
        TestAction::assert_eq(
            "JSON.stringify({a: [1]}, null, 2)",
            "{\n  \"a\": [\n    1\n  ]\n}",
        ),
        TestAction::assert_native_error(
            "var o = {}; o.self = o; JSON.stringify(o);",
            JsNativeErrorKind::Type,
            "Converting circular structure to JSON",
        ),
    ]);
}

#[test]
fn json_parse() {
    run_test_actions([
        TestAction::assert_eq("JSON.parse('42')", 42),
        TestAction::assert_eq("JSON.parse('\"x\"')", "x"),
        TestAction::assert_eq("JSON.parse('null') === null", true),
        TestAction::assert_eq("JSON.parse('{\"a\": [1, 2]}').a[1]", 2),
        TestAction::assert_eq("JSON.parse('[1e2]')[0]", 100),
        TestAction::assert_eq("JSON.parse('\"\\\\u0041\"')", "A"),
        TestAction::assert_native_error(
            "JSON.parse('{a: 1}');",
            JsNativeErrorKind::Syntax,
            "Expected a string key at position 1",
        ),
        TestAction::assert_native_error(
            "JSON.parse('01');",
            JsNativeErrorKind::Syntax,
            "Unexpected number at position 1",
        ),
        TestAction::assert_native_error(
            "JSON.parse('[1,]');",
            JsNativeErrorKind::Syntax,
            "Unexpected token at position 3",
        ),
    ]);
}

#[test]
fn json_round_trip() {
    run_test_actions([TestAction::assert(
        indoc! {r#"
            var v = {a: [1, 2.5, 'x', null, true], o: {nested: 'yes'}, n: -3};
            var round = JSON.parse(JSON.stringify(v));
            JSON.stringify(round) === JSON.stringify(v)
        "#},
    )]);
}

#[test]
fn json_parse_reviver_can_delete_siblings() {
    run_test_actions([TestAction::assert_eq(
        indoc! {r#"
            var result = JSON.parse('{"a":1,"b":2}', function(k, v) {
                delete this['b'];
                return v;
            });
            JSON.stringify(result)
        "#},
        r#"{"a":1}"#,
    )]);
}

#[test]
fn date_field_overflow_carries() {
    run_test_actions([
        TestAction::assert_eq(
            indoc! {r#"
                var d = new Date(1308895323625);
                d.setMinutes(3, 2, 5003);
                d.getTime()
            "#},
            1_308_895_387_003_i64 as f64,
        ),
        TestAction::assert_eq("new Date(2011, 13, 1).getFullYear()", 2012),
        TestAction::assert_eq("new Date(2011, 13, 1).getMonth()", 1),
        TestAction::assert_eq("new Date(0).getTime()", 0),
        TestAction::assert_eq("new Date(86400000).getDay()", 5),
    ]);
}

#[test]
fn date_parsing_and_formatting() {
    run_test_actions([
        TestAction::assert_eq("Date.parse('1970-01-02')", 86_400_000),
        TestAction::assert_eq(
            "Date.parse('2011-06-24T06:02:03.625Z')",
            1_308_895_323_625_i64 as f64,
        ),
        TestAction::assert("isNaN(Date.parse('not a date'))"),
        TestAction::assert_eq(
            "new Date(1308895323625).toISOString()",
            "2011-06-24T06:02:03.625Z",
        ),
        TestAction::assert_eq("new Date(0).toString()", "Thu Jan 01 1970 00:00:00 GMT+0000 (UTC)"),
        TestAction::assert_eq("new Date(0).getTimezoneOffset()", 0),
        TestAction::assert_eq("Date.UTC(1970, 0, 2)", 86_400_000),
        TestAction::assert("Date.now() > 1600000000000"),
    ]);
}

#[test]
fn error_hierarchy() {
    run_test_actions([
        TestAction::assert_eq("new Error('boom').message", "boom"),
        TestAction::assert_eq("new TypeError('t').name", "TypeError"),
        TestAction::assert_eq("String(new RangeError('r'))", "RangeError: r"),
        TestAction::assert_eq("String(new Error())", "Error"),
        TestAction::assert_eq(
            "var e = new Error('m'); e.name = ''; String(e)",
            "m",
        ),
        TestAction::assert("new TypeError('x') instanceof Error"),
        TestAction::assert("new SyntaxError('x') instanceof SyntaxError"),
        TestAction::assert_eq(
            "try { null.f(); } catch (e) { e instanceof TypeError }",
            true,
        ),
        TestAction::assert_eq("typeof InternalError", "function"),
        TestAction::assert_eq("typeof MemoryError", "function"),
    ]);
}

#[test]
fn symbols() {
    run_test_actions([
        TestAction::assert("Symbol() !== Symbol()"),
        TestAction::assert_eq("Symbol('tag').description", "tag"),
        TestAction::assert_eq("Symbol('tag').toString()", "Symbol(tag)"),
        TestAction::assert("Symbol.for('k') === Symbol.for('k')"),
        TestAction::assert_eq("Symbol.keyFor(Symbol.for('k'))", "k"),
        TestAction::assert_eq("Symbol.keyFor(Symbol('x')) === undefined", true),
        TestAction::assert_eq("typeof Symbol.iterator", "symbol"),
        TestAction::assert_eq("Symbol.iterator.description", "Symbol.iterator"),
        TestAction::assert_native_error(
            "new Symbol();",
            JsNativeErrorKind::Type,
            "Symbol is not a constructor",
        ),
        TestAction::assert_eq(
            "var s = Symbol('key'); var o = {}; o[s] = 7; o[s]",
            7,
        ),
        TestAction::assert_eq(
            "var s = Symbol('hidden'); var o = {a: 1}; o[s] = 2; Object.keys(o).join(',')",
            "a",
        ),
    ]);
}

#[test]
fn uri_functions() {
    run_test_actions([
        TestAction::assert_eq("encodeURIComponent('a b&c')", "a%20b%26c"),
        TestAction::assert_eq("encodeURI('http://x/a b')", "http://x/a%20b"),
        TestAction::assert_eq("decodeURIComponent('a%20b%26c')", "a b&c"),
        TestAction::assert_eq("encodeURIComponent('β')", "%CE%B2"),
        TestAction::assert_eq("decodeURIComponent('%CE%B2')", "β"),
        TestAction::assert_native_error(
            "decodeURIComponent('%');",
            JsNativeErrorKind::Uri,
            "URI malformed",
        ),
    ]);
}

#[test]
fn array_buffer() {
    run_test_actions([
        TestAction::assert_eq("new ArrayBuffer(8).byteLength", 8),
        TestAction::assert_eq("new ArrayBuffer(8).slice(2, 6).byteLength", 4),
        TestAction::assert_eq("ArrayBuffer.isView([])", false),
        TestAction::assert_native_error(
            "new ArrayBuffer(-1);",
            JsNativeErrorKind::Range,
            "Invalid array buffer length",
        ),
    ]);
}

#[test]
fn engine_object_dump() {
    run_test_actions([
        TestAction::assert_eq("adder.dump([1, , 'x'])", "[1,<empty>,'x']"),
        TestAction::assert_eq("adder.dump(new Boolean(true))", "[Boolean: true]"),
        TestAction::assert_eq("adder.dump(-0)", "-0"),
        TestAction::assert_eq("adder.dump({a: 1, b: 'x'})", "{a:1,b:'x'}"),
        TestAction::assert_eq(
            "adder.dump({get a() { return 1; }})",
            "{a:[Getter]}",
        ),
        TestAction::assert_eq(
            "var o = {}; o.self = o; adder.dump(o)",
            "{self:[Circular]}",
        ),
        TestAction::assert_eq("typeof adder.version", "string"),
    ]);
}

#[test]
fn timers_require_a_host_hook() {
    run_test_actions([TestAction::assert_native_error(
        "setTimeout(function() {}, 0);",
        JsNativeErrorKind::Internal,
        "not supported by host environment",
    )]);
}

#[test]
fn crypto_module() {
    run_test_actions([
        TestAction::assert_eq(
            "require('crypto').createHash('md5').update('abc').digest('hex')",
            "900150983cd24fb0d6963f7d28e17f72",
        ),
        TestAction::assert_eq(
            "require('crypto').createHash('sha1').update('abc').digest('hex')",
            "a9993e364706816aba3e25717850c26c9cd0d89d",
        ),
        TestAction::assert_eq(
            "require('crypto').createHash('sha256').update('abc').digest('hex')",
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
        ),
        TestAction::assert_eq(
            "require('crypto').createHash('sha256').update('a').update('bc').digest('hex')",
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
        ),
        TestAction::assert_eq(
            "require('crypto').createHash('md5').update('abc').digest('base64')",
            "kAFQmDzST7DWlj99KOF/cg==",
        ),
        TestAction::assert_eq(
            "require('crypto').createHash('md5').update('abc').digest('base64url')",
            "kAFQmDzST7DWlj99KOF_cg",
        ),
        TestAction::assert_eq(
            "require('crypto').createHmac('sha256', 'key').update('data').digest('hex')",
            "5031fe3d989c6d1537a013fa6e739da23463fdaec3b70137d828e36ace221bd0",
        ),
        TestAction::assert_native_error(
            "require('crypto').createHash('sha512');",
            JsNativeErrorKind::Type,
            "Unknown digest algorithm: \"sha512\"",
        ),
        TestAction::assert_native_error(
            indoc! {r#"
                var h = require('crypto').createHash('md5');
                h.digest('hex');
                h.digest('hex');
            "#},
            JsNativeErrorKind::Internal,
            "Hash state was already consumed",
        ),
    ]);
}

#[test]
fn unknown_module_is_an_error() {
    run_test_actions([TestAction::assert_native_error(
        "require('nope');",
        JsNativeErrorKind::Error,
        "Cannot find module \"nope\"",
    )]);
}
