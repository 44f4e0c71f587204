//! Набор универсальных макросов для приложений SSSM.
//!
//! Сгенерированный код ссылается на `LedgerError`, поэтому тип ошибки должен
//! быть доступен в области видимости, где применяется derive.
use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DataStruct, DeriveInput, Fields, LitStr, parse_macro_input};

/// Макрос `PipeDisplay` генерирует для структуры реализацию `Display`
/// и `FromStr` в строковом формате с полями, разделёнными `|`, в порядке
/// объявления полей.
///
/// Количество полей проверяется, а каждое поле разбирается через его
/// собственный `FromStr` (пробелы по краям отбрасываются). Ошибки
/// возвращаются как `LedgerError::InvalidInput`.
#[proc_macro_derive(PipeDisplay)]
pub fn derive_pipe_display(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let struct_name = &input.ident;

    let named = match &input.data {
        Data::Struct(DataStruct {
            fields: Fields::Named(fields),
            ..
        }) => &fields.named,
        _ => panic!("PipeDisplay допустимо использовать только со структурами"),
    };

    let fields: Vec<_> = named
        .iter()
        .filter_map(|field| field.ident.as_ref())
        .collect();

    let fields_count = fields.len();

    // "{}|{}|{}"
    let fmt_string = vec!["{}"; fields_count].join("|");
    let fmt_lit = LitStr::new(&fmt_string, proc_macro2::Span::call_site());

    let fields_parses: Vec<_> = fields
        .iter()
        .enumerate()
        .map(|(i, field_name)| {
            quote! {
                #field_name: parts[#i]
                    .trim()
                    .parse()
                    .map_err(|_| LedgerError::invalid_input(format!(
                        "не удалось разобрать поле `{}` (позиция {}) в строке `{}`",
                        stringify!(#field_name), #i, s
                    )))?,
            }
        })
        .collect();

    let output = quote! {
        impl std::fmt::Display for #struct_name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, #fmt_lit, #(self.#fields),*)
            }
        }

        impl std::str::FromStr for #struct_name {
            type Err = LedgerError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let parts: Vec<&str> = s.trim().split('|').collect();
                if parts.len() != #fields_count {
                    return Err(LedgerError::invalid_input(format!(
                        "ожидается {} полей, разделённых '|', получено {} в строке `{}`",
                        #fields_count,
                        parts.len(),
                        s
                    )));
                }
                Ok(Self {
                    #(#fields_parses)*
                })
            }
        }
    };

    TokenStream::from(output)
}

/// Derive-макрос `LedgerEnum` для словарных перечислений реестра (вид
/// акции, направление сделки).
///
/// Для каждого unit-варианта задаётся каноническое имя и, при необходимости,
/// короткие синонимы: `#[ledger(name = "buy", alias = "b")]`. Без атрибута
/// имя варианта берётся в нижнем регистре. Генерирует:
///
/// - `as_str()` — каноническое имя варианта
/// - `VARIANTS` — все варианты в порядке объявления
/// - [`std::fmt::Display`] через каноническое имя
/// - [`std::str::FromStr`], нечувствительный к регистру и принимающий
///   синонимы; ошибка `LedgerError::InvalidInput` перечисляет допустимые имена
///
/// ## Пример
///
/// ```ignore
/// use macros::LedgerEnum;
///
/// #[derive(Debug, Clone, Copy, LedgerEnum)]
/// enum TradeIndicator {
///     #[ledger(name = "buy", alias = "b")]
///     Buy,
///     #[ledger(name = "sell", alias = "s")]
///     Sell,
/// }
///
/// assert_eq!("B".parse::<TradeIndicator>().unwrap().as_str(), "buy");
/// ```
#[proc_macro_derive(LedgerEnum, attributes(ledger))]
pub fn derive_ledger_enum(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let variants = match &input.data {
        Data::Enum(e) => &e.variants,
        _ => {
            return syn::Error::new_spanned(name, "LedgerEnum допустимо использовать только с enum")
                .to_compile_error()
                .into();
        }
    };

    let mut idents = Vec::new();
    let mut names = Vec::new();
    let mut from_arms = Vec::new();

    for v in variants {
        let ident = &v.ident;
        if !matches!(v.fields, Fields::Unit) {
            return syn::Error::new_spanned(v, "LedgerEnum: поддерживаются только unit-варианты")
                .to_compile_error()
                .into();
        }

        let mut canonical = ident.to_string().to_lowercase();
        let mut aliases: Vec<String> = Vec::new();
        for attr in v.attrs.iter().filter(|a| a.path().is_ident("ledger")) {
            let parsed = attr.parse_nested_meta(|meta| {
                let value: LitStr = meta.value()?.parse()?;
                if meta.path.is_ident("name") {
                    canonical = value.value().to_lowercase();
                } else if meta.path.is_ident("alias") {
                    aliases.push(value.value().to_lowercase());
                } else {
                    return Err(meta.error("ожидается `name` или `alias`"));
                }
                Ok(())
            });
            if let Err(err) = parsed {
                return err.to_compile_error().into();
            }
        }

        let accepted: Vec<LitStr> = std::iter::once(&canonical)
            .chain(aliases.iter())
            .map(|s| LitStr::new(s, proc_macro2::Span::call_site()))
            .collect();
        from_arms.push(quote! { #(#accepted)|* => Ok(#name::#ident), });

        idents.push(ident.clone());
        names.push(LitStr::new(&canonical, proc_macro2::Span::call_site()));
    }

    let allowed = names
        .iter()
        .map(LitStr::value)
        .collect::<Vec<_>>()
        .join(", ");

    let expanded = quote! {
        impl #name {
            /// Все варианты в порядке объявления.
            pub const VARIANTS: &'static [#name] = &[#(#name::#idents),*];

            /// Каноническое имя варианта.
            pub fn as_str(&self) -> &'static str {
                match self { #(#name::#idents => #names,)* }
            }
        }

        impl std::fmt::Display for #name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for #name {
            type Err = LedgerError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    #(#from_arms)*
                    _ => Err(LedgerError::invalid_input(format!(
                        "{}: неизвестное значение `{}`, ожидается одно из: {}",
                        stringify!(#name), s.trim(), #allowed
                    ))),
                }
            }
        }
    };

    TokenStream::from(expanded)
}
